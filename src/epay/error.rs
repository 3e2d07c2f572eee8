// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway client errors.

use super::callback::RejectReason;

/// Errors surfaced by the gateway client.
///
/// Cryptographic, transport and remote failures stay distinct so callers can
/// tell a bad signature from a bad configuration or an unreachable gateway.
/// Callback verification is the one operation that collapses these into a
/// boolean.
#[derive(Debug, thiserror::Error)]
pub enum EpayError {
    #[error("Epay configuration invalid: {0}")]
    Configuration(String),

    #[error("Epay signing failed: {0}")]
    Signing(String),

    #[error("Epay verification key unusable: {0}")]
    Verification(String),

    #[error("Epay request failed: {0}")]
    Transport(String),

    #[error("Epay gateway returned code {code}: {msg}")]
    Gateway { code: i64, msg: String },

    #[error("Epay response failed verification: {0}")]
    ResponseVerification(RejectReason),

    #[error("Epay response was invalid: {0}")]
    InvalidResponse(String),

    #[error("Epay request was invalid: {0}")]
    InvalidRequest(String),
}

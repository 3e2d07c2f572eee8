// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Epay payment gateway integration.
//!
//! This module speaks the gateway's signed form protocol:
//!
//! - Every outbound request carries `pid`, `timestamp`, `sign` and
//!   `sign_type`. The signature is RSA-SHA256 over the canonical string of
//!   all other non-empty scalar parameters.
//! - Every successful response and every inbound notification is signed by
//!   the gateway with the same canonicalization and must be verified with the
//!   gateway public key before it is trusted.
//!
//! ## Submodules
//!
//! - `signing` - canonicalization and RSA sign/verify primitives
//! - `client` - request building, dispatch and response validation
//! - `callback` - inbound notification evaluation
//! - `transport` - HTTP seam (reqwest by default, swappable in tests)
//! - `types` - credentials, parameter sets and gateway responses

pub mod callback;
pub mod client;
pub mod error;
pub mod signing;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_keys;

pub use callback::{NotificationOutcome, PaymentNotice, RejectReason, REPLAY_WINDOW_SECS};
pub use client::EpayClient;
pub use error::EpayError;
pub use signing::SignatureEncoding;
pub use transport::{GatewayTransport, HttpTransport};
pub use types::{Credentials, GatewayResponse, ParameterSet, PaymentType};

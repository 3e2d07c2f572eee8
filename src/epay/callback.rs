// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Inbound notification evaluation.
//!
//! A notification moves through
//! `RECEIVED -> VERIFIED -> ACCEPTED` when it is gateway-signed, fresh and
//! reports `TRADE_SUCCESS`; any other path ends in `REJECTED` with a reason.
//! Both outcomes are terminal. Re-delivery is the gateway's business and
//! crediting must be idempotent per `out_trade_no` on the caller's side.

use std::fmt;

use chrono::Utc;
use tracing::{info, warn};

use super::{
    client::EpayClient,
    types::{ParameterSet, TRADE_SUCCESS},
};

/// Maximum distance in seconds between a signed message's `timestamp` and
/// the verifier's clock. A distance of exactly this value is accepted.
pub const REPLAY_WINDOW_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingSignature,
    MissingTimestamp,
    Expired,
    SignatureInvalid,
    StatusNotFinal,
    MissingOrderReference,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingSignature => "missing_signature",
            RejectReason::MissingTimestamp => "missing_timestamp",
            RejectReason::Expired => "expired",
            RejectReason::SignatureInvalid => "signature_invalid",
            RejectReason::StatusNotFinal => "status_not_final",
            RejectReason::MissingOrderReference => "missing_order_reference",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verified payment confirmation handed to order settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotice {
    pub out_trade_no: String,
    pub trade_no: String,
    pub trade_status: String,
    pub money: Option<String>,
    pub payment_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Accepted(PaymentNotice),
    Rejected(RejectReason),
}

impl NotificationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, NotificationOutcome::Accepted(_))
    }
}

impl EpayClient {
    /// Evaluate a notification or return-page callback.
    pub fn evaluate_notification(&self, params: &ParameterSet) -> NotificationOutcome {
        self.evaluate_notification_at(params, Utc::now().timestamp())
    }

    /// [`evaluate_notification`](Self::evaluate_notification) against an
    /// explicit clock (Unix seconds).
    pub fn evaluate_notification_at(&self, params: &ParameterSet, now: i64) -> NotificationOutcome {
        let out_trade_no = params.get_text("out_trade_no");

        if let Err(reason) = self.check_signed_fields(params, now) {
            warn!(out_trade_no = ?out_trade_no, reason = %reason, "Epay notification rejected");
            return NotificationOutcome::Rejected(reason);
        }

        let trade_status = params.get_text("trade_status").unwrap_or_default();
        if trade_status != TRADE_SUCCESS {
            info!(
                out_trade_no = ?out_trade_no,
                trade_status = %trade_status,
                "Epay notification verified but not final"
            );
            return NotificationOutcome::Rejected(RejectReason::StatusNotFinal);
        }

        let Some(out_trade_no) = out_trade_no.filter(|s| !s.trim().is_empty()) else {
            warn!("Epay notification verified but carries no out_trade_no");
            return NotificationOutcome::Rejected(RejectReason::MissingOrderReference);
        };

        NotificationOutcome::Accepted(PaymentNotice {
            out_trade_no,
            trade_no: params.get_text("trade_no").unwrap_or_default(),
            trade_status,
            money: params.get_text("money"),
            payment_type: params.get_text("type"),
        })
    }
}

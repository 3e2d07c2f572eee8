// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway callbacks.
//!
//! - `notify_url` is the authoritative server-to-server confirmation. Only an
//!   accepted notification reaches order settlement, and the gateway keeps
//!   re-delivering until it reads `success`.
//! - `return_url` is where the buyer's browser lands after paying. It is
//!   verified the same way but only reports status; it never settles.
//!
//! Query strings are decoded leniently, so a malformed one fails verification
//! instead of earning an HTTP 400 the gateway would not understand.

use axum::{
    extract::{RawQuery, State},
    Json,
};
use tracing::{info, warn};

use crate::{
    epay::{NotificationOutcome, ParameterSet, RejectReason},
    models::PaymentReturnResponse,
    state::AppState,
};

/// Acknowledgement bodies the gateway expects from the notify endpoint.
pub const NOTIFY_SUCCESS: &str = "success";
pub const NOTIFY_FAIL: &str = "fail";

/// Decode a callback query string. Bad percent escapes are kept literally and
/// invalid UTF-8 is replaced, which the signature check then rejects.
fn callback_params(query: Option<String>) -> ParameterSet {
    let query = query.unwrap_or_default();
    ParameterSet::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
}

#[utoipa::path(
    get,
    path = "/notify_url",
    tag = "Callbacks",
    responses(
        (status = 200, description = "`success` once the payment is verified and settled, `fail` otherwise", body = String, content_type = "text/plain")
    )
)]
pub async fn notify(State(state): State<AppState>, RawQuery(query): RawQuery) -> &'static str {
    let params = callback_params(query);

    let notice = match state.epay.evaluate_notification(&params) {
        NotificationOutcome::Accepted(notice) => notice,
        NotificationOutcome::Rejected(_) => return NOTIFY_FAIL,
    };

    match state.settlement.settle(&notice).await {
        Ok(()) => {
            info!(
                out_trade_no = %notice.out_trade_no,
                trade_no = %notice.trade_no,
                "Payment notification settled"
            );
            NOTIFY_SUCCESS
        }
        Err(e) => {
            warn!(
                out_trade_no = %notice.out_trade_no,
                error = %e,
                "Payment settlement failed; gateway will re-deliver"
            );
            NOTIFY_FAIL
        }
    }
}

#[utoipa::path(
    get,
    path = "/return_url",
    tag = "Callbacks",
    responses(
        (status = 200, description = "Payment status for display", body = PaymentReturnResponse)
    )
)]
pub async fn payment_return(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Json<PaymentReturnResponse> {
    let params = callback_params(query);

    let response = match state.epay.evaluate_notification(&params) {
        NotificationOutcome::Accepted(notice) => PaymentReturnResponse {
            success: true,
            message: "Payment succeeded".to_string(),
            out_trade_no: Some(notice.out_trade_no),
            trade_status: Some(notice.trade_status),
        },
        NotificationOutcome::Rejected(RejectReason::StatusNotFinal) => PaymentReturnResponse {
            success: false,
            message: "Payment not completed".to_string(),
            out_trade_no: params.get_text("out_trade_no"),
            trade_status: params.get_text("trade_status"),
        },
        NotificationOutcome::Rejected(_) => PaymentReturnResponse {
            success: false,
            message: "Verification failed".to_string(),
            out_trade_no: None,
            trade_status: None,
        },
    };

    Json(response)
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound payment initiation.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Local;
use tracing::info;

use crate::{
    epay::{
        client::DEFAULT_SUBMIT_LABEL, types::normalize_amount, ParameterSet, PaymentType,
    },
    error::ApiError,
    models::{CreatePaymentRequest, PaymentLinkResponse, PaymentMode},
    state::AppState,
};

/// Merchant order number from the local clock, `yyyyMMddHHmmssSSS`.
pub fn generate_out_trade_no() -> String {
    Local::now().format("%Y%m%d%H%M%S%3f").to_string()
}

#[utoipa::path(
    post,
    path = "/v1/payments",
    request_body = CreatePaymentRequest,
    tag = "Payments",
    responses(
        (status = 200, description = "Signed auto-submit form (mode = form) or JSON PaymentLinkResponse (mode = link)", body = String, content_type = "text/html"),
        (status = 400, description = "Invalid payment type, name or amount")
    )
)]
pub async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<Response, ApiError> {
    let payment_type: PaymentType = request.payment_type.parse()?;
    let money = normalize_amount(&request.money)?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let out_trade_no = request
        .out_trade_no
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_out_trade_no);

    let mut params = ParameterSet::new();
    params.insert("out_trade_no", out_trade_no.as_str());
    params.insert("type", payment_type.as_str());
    params.insert("name", name);
    params.insert("money", money.as_str());

    info!(
        out_trade_no = %out_trade_no,
        payment_type = %payment_type,
        money = %money,
        mode = ?request.mode,
        "Initiating payment"
    );

    match request.mode {
        PaymentMode::Form => {
            let html = state.epay.build_redirect_form(&params, DEFAULT_SUBMIT_LABEL)?;
            Ok(Html(html).into_response())
        }
        PaymentMode::Link => {
            let url = state.epay.build_redirect_link(&params)?;
            Ok(Json(PaymentLinkResponse { out_trade_no, url }).into_response())
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the top-up entry points. Types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation.
//!
//! ## Model Categories
//!
//! - **Payments**: outbound payment initiation (form or link)
//! - **Callbacks**: browser return-page status
//! - **Health**: liveness

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Payments
// =============================================================================

/// How the signed payment request is handed back to the browser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Auto-submitting HTML form (`text/html`).
    #[default]
    Form,
    /// Cashier URL with the signed request in its query string.
    Link,
}

/// Request body for starting a top-up payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    /// Merchant order number. Generated from the clock when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_trade_no: Option<String>,
    /// Payment channel: `alipay`, `wxpay`, `qqpay` or `bank`.
    #[serde(rename = "type")]
    pub payment_type: String,
    /// Product name shown on the cashier page.
    pub name: String,
    /// Amount as a decimal string (e.g. "10.00").
    pub money: String,
    #[serde(default)]
    pub mode: PaymentMode,
}

/// Response for `mode = "link"`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentLinkResponse {
    pub out_trade_no: String,
    /// Cashier URL to open in the browser.
    pub url: String,
}

// =============================================================================
// Callbacks
// =============================================================================

/// Status shown on the return page. Informational only; settlement happens
/// through the asynchronous notification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentReturnResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_trade_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_status: Option<String>,
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Gateway base URL in use.
    pub gateway: String,
    /// Signature encoding in use (`base64` or `hex`).
    pub signature_encoding: String,
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Epay gateway client.
//!
//! The client is an explicitly constructed value: credentials are immutable
//! and shared behind an `Arc`, the transport is injected. Every call builds
//! its own signed request, so one client can serve concurrent requests
//! without coordination.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::{
    callback::{RejectReason, REPLAY_WINDOW_SECS},
    error::EpayError,
    signing::{self, canonicalize},
    transport::{GatewayTransport, HttpTransport},
    types::{normalize_amount, Credentials, GatewayResponse, ParameterSet, SIGN_TYPE},
};

const SUBMIT_PATH: &str = "api/pay/submit";
const CREATE_PATH: &str = "api/pay/create";
const QUERY_PATH: &str = "api/pay/query";
const REFUND_PATH: &str = "api/pay/refund";

/// Label of the fallback submit button in redirect forms.
pub const DEFAULT_SUBMIT_LABEL: &str = "Redirecting to payment";

#[derive(Clone)]
pub struct EpayClient {
    credentials: Arc<Credentials>,
    transport: Arc<dyn GatewayTransport>,
}

impl std::fmt::Debug for EpayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpayClient")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl EpayClient {
    pub fn new(credentials: Credentials, transport: Arc<dyn GatewayTransport>) -> Self {
        Self {
            credentials: Arc::new(credentials),
            transport,
        }
    }

    /// Client backed by reqwest with the given per-request timeout.
    pub fn with_http(credentials: Credentials, timeout: Duration) -> Result<Self, EpayError> {
        let transport = HttpTransport::with_timeout(timeout)?;
        Ok(Self::new(credentials, Arc::new(transport)))
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // -------------------------------------------------------------------------
    // Request building
    // -------------------------------------------------------------------------

    /// Sign a copy of `params` for submission to the gateway.
    ///
    /// Adds `pid`, `timestamp` (Unix seconds), the configured
    /// `notify_url`/`return_url` unless the caller set them, then `sign` and
    /// `sign_type`. Caller-supplied `sign`/`sign_type` are discarded.
    pub fn build_signed_request(&self, params: &ParameterSet) -> Result<ParameterSet, EpayError> {
        self.build_signed_request_at(params, Utc::now().timestamp())
    }

    pub(crate) fn build_signed_request_at(
        &self,
        params: &ParameterSet,
        timestamp: i64,
    ) -> Result<ParameterSet, EpayError> {
        let creds = &self.credentials;
        let mut request = params.clone();
        request.remove("sign");
        request.remove("sign_type");
        request.insert("pid", creds.pid());
        request.insert("timestamp", timestamp.to_string());

        if let Some(url) = creds.notify_url() {
            if !request.contains_key("notify_url") {
                request.insert("notify_url", url);
            }
        }
        if let Some(url) = creds.return_url() {
            if !request.contains_key("return_url") {
                request.insert("return_url", url);
            }
        }

        let sign = signing::sign(
            creds.merchant_private_key(),
            &canonicalize(&request),
            creds.encoding(),
        )?;
        request.insert("sign", sign);
        request.insert("sign_type", SIGN_TYPE);
        Ok(request)
    }

    /// Auto-submitting HTML form that posts a signed request to the cashier.
    ///
    /// The caller injects the markup into the page; nothing is sent here.
    pub fn build_redirect_form(
        &self,
        params: &ParameterSet,
        submit_label: &str,
    ) -> Result<String, EpayError> {
        let request = self.build_signed_request(params)?;
        let action = self.endpoint(SUBMIT_PATH);

        let mut html = format!(
            r#"<form id="dopay" action="{}" method="post">"#,
            escape_html(&action)
        );
        for (key, value) in request.to_form_pairs() {
            html.push_str(&format!(
                r#"<input type="hidden" name="{}" value="{}"/>"#,
                escape_html(&key),
                escape_html(&value)
            ));
        }
        html.push_str(&format!(
            r#"<input type="submit" value="{}"></form><script>document.getElementById("dopay").submit();</script>"#,
            escape_html(submit_label)
        ));
        Ok(html)
    }

    /// Cashier URL carrying a signed request as its query string.
    pub fn build_redirect_link(&self, params: &ParameterSet) -> Result<String, EpayError> {
        let request = self.build_signed_request(params)?;
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(request.to_form_pairs())
            .finish();
        Ok(format!("{}?{}", self.endpoint(SUBMIT_PATH), query))
    }

    // -------------------------------------------------------------------------
    // API operations
    // -------------------------------------------------------------------------

    /// Create an order through the direct API (`api/pay/create`).
    pub async fn create_order(&self, params: &ParameterSet) -> Result<GatewayResponse, EpayError> {
        self.execute(CREATE_PATH, params).await
    }

    pub async fn query_order(&self, trade_no: &str) -> Result<GatewayResponse, EpayError> {
        let trade_no = required_field("trade_no", trade_no)?;
        let mut params = ParameterSet::new();
        params.insert("trade_no", trade_no);
        self.execute(QUERY_PATH, &params).await
    }

    /// Whether the gateway reports the order as settled.
    pub async fn is_order_paid(&self, trade_no: &str) -> Result<bool, EpayError> {
        Ok(self.query_order(trade_no).await?.is_paid())
    }

    /// Refund `amount` (gateway currency, up to two decimals) of an order.
    pub async fn refund(
        &self,
        out_refund_no: &str,
        trade_no: &str,
        amount: &str,
    ) -> Result<GatewayResponse, EpayError> {
        let out_refund_no = required_field("out_refund_no", out_refund_no)?;
        let trade_no = required_field("trade_no", trade_no)?;
        let money = normalize_amount(amount)?;

        let mut params = ParameterSet::new();
        params.insert("trade_no", trade_no);
        params.insert("money", money);
        params.insert("out_refund_no", out_refund_no);
        self.execute(REFUND_PATH, &params).await
    }

    /// Sign, send and validate one API call.
    ///
    /// A `code == 0` response is returned only after its signature and
    /// timestamp check out; an unsigned success is never trusted.
    pub async fn execute(
        &self,
        path: &str,
        params: &ParameterSet,
    ) -> Result<GatewayResponse, EpayError> {
        let path = path.trim_start_matches('/');
        let url = self.endpoint(path);
        let request = self.build_signed_request(params)?;

        debug!(path = %path, out_trade_no = ?params.get_text("out_trade_no"), "Epay API call");
        let body = self.transport.post_form(&url, &request.to_form_pairs()).await?;
        let response = GatewayResponse::from_body(&body)?;

        if !response.is_success() {
            let msg = response.msg().unwrap_or_else(|| "request failed".to_string());
            warn!(path = %path, code = response.code(), msg = %msg, "Epay gateway reported failure");
            return Err(EpayError::Gateway {
                code: response.code(),
                msg,
            });
        }

        if let Err(reason) = self.check_signed_fields(response.fields(), Utc::now().timestamp()) {
            warn!(path = %path, reason = %reason, "Epay response failed verification");
            return Err(EpayError::ResponseVerification(reason));
        }

        info!(
            path = %path,
            trade_no = ?response.trade_no(),
            out_trade_no = ?response.out_trade_no(),
            "Epay API call verified"
        );
        Ok(response)
    }

    // -------------------------------------------------------------------------
    // Verification
    // -------------------------------------------------------------------------

    /// Trust gate for gateway-signed parameters (notify/return callbacks).
    ///
    /// True only when `sign` is present, `timestamp` is within
    /// [`REPLAY_WINDOW_SECS`] of now, and the signature verifies. Never
    /// panics or errors, and touches no state.
    pub fn verify_callback(&self, params: &ParameterSet) -> bool {
        self.check_signed_fields(params, Utc::now().timestamp())
            .is_ok()
    }

    /// Same checks as [`verify_callback`](Self::verify_callback), reporting
    /// which one failed. `now` is Unix seconds.
    pub fn check_signed_fields(
        &self,
        params: &ParameterSet,
        now: i64,
    ) -> Result<(), RejectReason> {
        let sign = params
            .get_text("sign")
            .filter(|s| !s.trim().is_empty())
            .ok_or(RejectReason::MissingSignature)?;

        let timestamp = params
            .get_text("timestamp")
            .and_then(|t| t.trim().parse::<i64>().ok())
            .ok_or(RejectReason::MissingTimestamp)?;

        if now.abs_diff(timestamp) > REPLAY_WINDOW_SECS {
            return Err(RejectReason::Expired);
        }

        let creds = &self.credentials;
        match signing::verify(
            creds.platform_public_key(),
            &canonicalize(params),
            &sign,
            creds.encoding(),
        ) {
            Ok(true) => Ok(()),
            Ok(false) => Err(RejectReason::SignatureInvalid),
            Err(e) => {
                error!(error = %e, "Epay platform public key unusable");
                Err(RejectReason::SignatureInvalid)
            }
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.credentials.api_url(), path.trim_start_matches('/'))
    }
}

fn required_field(name: &str, value: &str) -> Result<String, EpayError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EpayError::InvalidRequest(format!("{name} is required")));
    }
    Ok(trimmed.to_string())
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::epay::EpayError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<EpayError> for ApiError {
    fn from(err: EpayError) -> Self {
        match err {
            EpayError::InvalidRequest(msg) => ApiError::bad_request(msg),
            EpayError::Gateway { .. }
            | EpayError::ResponseVerification(_)
            | EpayError::InvalidResponse(_)
            | EpayError::Transport(_) => ApiError::bad_gateway(err.to_string()),
            EpayError::Configuration(_) | EpayError::Signing(_) | EpayError::Verification(_) => {
                error!(error = %err, "Payment gateway misconfigured");
                ApiError::internal("Payment gateway is misconfigured")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

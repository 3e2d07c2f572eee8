// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{models::HealthResponse, state::AppState};

/// Liveness probe.
///
/// Reports the gateway this instance signs for. Does not call the gateway.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let creds = state.epay.credentials();
    Json(HealthResponse {
        status: "ok".to_string(),
        gateway: creds.api_url().to_string(),
        signature_encoding: creds.encoding().to_string(),
    })
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        CreatePaymentRequest, HealthResponse, PaymentLinkResponse, PaymentMode,
        PaymentReturnResponse,
    },
    state::AppState,
};

pub mod callbacks;
pub mod health;
pub mod payments;

#[cfg(test)]
pub(crate) mod test_support;

/// Gateway-facing callback paths. They must match the URLs registered as
/// `notify_url`/`return_url`.
pub const NOTIFY_PATH: &str = "/notify_url";
pub const RETURN_PATH: &str = "/return_url";

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/payments", post(payments::create_payment))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route(NOTIFY_PATH, get(callbacks::notify))
        .route(RETURN_PATH, get(callbacks::payment_return))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        payments::create_payment,
        callbacks::notify,
        callbacks::payment_return,
        health::health
    ),
    components(
        schemas(
            CreatePaymentRequest,
            PaymentMode,
            PaymentLinkResponse,
            PaymentReturnResponse,
            HealthResponse
        )
    ),
    tags(
        (name = "Payments", description = "Top-up payment initiation"),
        (name = "Callbacks", description = "Gateway notify and return handlers"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process, sync::Arc};

use epay_gateway::{
    api::router,
    config::{GatewayConfig, ServerConfig, DEFAULT_LOG_FILTER},
    epay::EpayClient,
    settlement::LoggingSettlement,
    state::AppState,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let server = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            error!(error = %e, "Invalid server configuration");
            process::exit(1);
        }
    };
    init_tracing(server.json_logs);

    let gateway = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid gateway configuration");
            process::exit(1);
        }
    };

    let epay = match gateway
        .credentials()
        .and_then(|creds| EpayClient::with_http(creds, gateway.timeout))
    {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to initialize gateway client");
            process::exit(1);
        }
    };

    info!(
        gateway = %gateway.api_url,
        pid = %gateway.pid,
        encoding = %gateway.encoding,
        timeout_secs = gateway.timeout.as_secs(),
        "Gateway client ready"
    );

    let state = AppState::new(epay, Arc::new(LoggingSettlement));
    let app = router(state);

    let addr = server.bind_address();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(address = %addr, error = %e, "Failed to bind");
            process::exit(1);
        }
    };

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    info!(address = %addr, "Epay gateway listening (docs at /docs)");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
    {
        error!(error = %e, "Server error");
        process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

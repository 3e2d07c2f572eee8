// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures: throwaway keys, a stub gateway and a spawned service.

#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc, sync::OnceLock, time::Duration};

use axum::{
    extract::{Path, State},
    routing::post,
    Form, Json, Router,
};
use base64ct::{Base64, Encoding};
use chrono::Utc;
use epay_gateway::{
    api::router,
    epay::{
        signing::{self, canonicalize},
        Credentials, EpayClient, ParameterSet, SignatureEncoding,
    },
    settlement::LoggingSettlement,
    state::AppState,
};
use rsa::{
    pkcs8::{EncodePrivateKey, EncodePublicKey},
    RsaPrivateKey,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const PID: &str = "1001";

// Mirrors `src/epay/test_keys.rs`. That module is `cfg(test)` and not part
// of the library build integration tests link against, and exporting it
// would pull `rand` into the normal dependency set.
pub struct KeyPair {
    pub private_body: String,
    pub public_body: String,
}

fn generate() -> KeyPair {
    let key = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("generate RSA key");
    let private_der = key.to_pkcs8_der().expect("encode PKCS#8");
    let public_der = key
        .to_public_key()
        .to_public_key_der()
        .expect("encode SPKI");
    KeyPair {
        private_body: Base64::encode_string(private_der.as_bytes()),
        public_body: Base64::encode_string(public_der.as_bytes()),
    }
}

pub fn merchant_keys() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(generate)
}

pub fn gateway_keys() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(generate)
}

pub fn credentials(api_url: &str) -> Credentials {
    Credentials::new(
        api_url,
        PID,
        &merchant_keys().private_body,
        &gateway_keys().public_body,
    )
    .expect("test credentials")
}

/// Sign `params` in place with the gateway key.
pub fn gateway_sign(params: &mut ParameterSet) {
    let sign = signing::sign(
        &gateway_keys().private_body,
        &canonicalize(params),
        SignatureEncoding::Base64,
    )
    .expect("gateway sign");
    params.insert("sign", sign);
    params.insert("sign_type", "RSA");
}

/// Query pairs of a notification the gateway would send at `timestamp`.
pub fn signed_notification(timestamp: i64, trade_status: &str) -> Vec<(String, String)> {
    let mut params = ParameterSet::from_pairs([
        ("pid", PID),
        ("trade_no", "2024010112000001"),
        ("out_trade_no", "20240101120000123"),
        ("type", "alipay"),
        ("name", "VIP"),
        ("money", "10.00"),
        ("trade_status", trade_status),
    ]);
    params.insert("timestamp", timestamp.to_string());
    gateway_sign(&mut params);
    params.to_form_pairs()
}

// =============================================================================
// Stub gateway
// =============================================================================

/// How the stub gateway answers API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehavior {
    /// Verify the merchant signature, reply with a signed success.
    Honest,
    /// Reply `code = -1` with a message.
    Refuse,
    /// Reply with a signed success, then alter `money` after signing.
    Tamper,
    /// Reply with a success carrying no signature.
    Unsigned,
    /// Sleep before answering.
    Slow(Duration),
}

#[derive(Clone)]
struct StubState {
    behavior: StubBehavior,
}

async fn stub_api(
    State(stub): State<Arc<StubState>>,
    Path(action): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    if let StubBehavior::Slow(delay) = stub.behavior {
        tokio::time::sleep(delay).await;
    }

    let request = ParameterSet::from_pairs(form);
    let merchant_ok = request
        .get_text("sign")
        .map(|sign| {
            signing::verify(
                &merchant_keys().public_body,
                &canonicalize(&request),
                &sign,
                SignatureEncoding::Base64,
            )
            .unwrap_or(false)
        })
        .unwrap_or(false);

    if !merchant_ok || request.get_text("pid").as_deref() != Some(PID) {
        return Json(json!({ "code": -1, "msg": "sign error" }));
    }
    if stub.behavior == StubBehavior::Refuse {
        return Json(json!({ "code": -1, "msg": "order does not exist" }));
    }

    let mut reply = ParameterSet::new();
    reply.insert("code", 0);
    reply.insert("msg", "succ");
    reply.insert("trade_no", "2024010112000001");
    reply.insert("timestamp", Utc::now().timestamp().to_string());
    match action.as_str() {
        "create" => {
            let out_trade_no = request.get_text("out_trade_no").unwrap_or_default();
            reply.insert("out_trade_no", out_trade_no);
            reply.insert("pay_type", "jump");
            reply.insert("pay_info", "https://cashier.example.com/pay/2024010112000001");
        }
        "query" => {
            reply.insert("out_trade_no", "20240101120000123");
            reply.insert("money", "10.00");
            reply.insert("status", 1);
        }
        "refund" => {
            reply.insert("out_refund_no", request.get_text("out_refund_no").unwrap_or_default());
        }
        _ => return Json(json!({ "code": -4, "msg": "unknown action" })),
    }

    if stub.behavior != StubBehavior::Unsigned {
        gateway_sign(&mut reply);
    }
    if stub.behavior == StubBehavior::Tamper {
        reply.insert("money", "0.01");
    }

    Json(serde_json::to_value(&reply).expect("serialize reply"))
}

/// Start a stub gateway on an ephemeral port and return its base URL.
pub async fn spawn_gateway(behavior: StubBehavior) -> String {
    let app = Router::new()
        .route("/api/pay/{action}", post(stub_api))
        .with_state(Arc::new(StubState { behavior }));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub gateway");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub gateway");
    });

    format!("http://{addr}/")
}

// =============================================================================
// Service under test
// =============================================================================

/// Start the HTTP service against `api_url` and return its base URL.
pub async fn spawn_app(api_url: &str) -> String {
    let epay = EpayClient::with_http(credentials(api_url), Duration::from_secs(5))
        .expect("gateway client");
    let app = router(AppState::new(epay, Arc::new(LoggingSettlement)));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind app");
    let addr = listener.local_addr().expect("app address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("app server");
    });

    format!("http://{addr}")
}

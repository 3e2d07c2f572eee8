// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for handler tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::extract::RawQuery;

use crate::{
    epay::{
        signing::{self, canonicalize},
        test_keys::{gateway_keys, merchant_keys},
        Credentials, EpayClient, HttpTransport, ParameterSet, PaymentNotice, SignatureEncoding,
    },
    settlement::{OrderSettlement, SettlementError},
    state::AppState,
};

/// Settlement double that records every notice it is asked to settle.
pub(crate) struct RecordingSettlement {
    pub notices: Mutex<Vec<PaymentNotice>>,
    pub fail: bool,
}

impl RecordingSettlement {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            notices: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            notices: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn settled(&self) -> Vec<PaymentNotice> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderSettlement for RecordingSettlement {
    async fn settle(&self, notice: &PaymentNotice) -> Result<(), SettlementError> {
        self.notices.lock().unwrap().push(notice.clone());
        if self.fail {
            return Err(SettlementError::Unavailable("backend offline".to_string()));
        }
        Ok(())
    }
}

pub(crate) fn test_state(settlement: Arc<RecordingSettlement>) -> AppState {
    let creds = Credentials::new(
        "https://pay.example.com/",
        "1001",
        &merchant_keys().private_body,
        &gateway_keys().public_body,
    )
    .expect("test credentials");
    let epay = EpayClient::new(creds, Arc::new(HttpTransport::new().expect("http client")));
    AppState::new(epay, settlement)
}

/// Query parameters of a gateway notification signed at `timestamp`.
pub(crate) fn signed_notification(timestamp: i64, trade_status: &str) -> HashMap<String, String> {
    let mut params = ParameterSet::from_pairs([
        ("pid", "1001"),
        ("trade_no", "2024010112000001"),
        ("out_trade_no", "20240101120000123"),
        ("type", "alipay"),
        ("name", "VIP"),
        ("money", "10.00"),
        ("trade_status", trade_status),
    ]);
    params.insert("timestamp", timestamp.to_string());
    let sign = signing::sign(
        &gateway_keys().private_body,
        &canonicalize(&params),
        SignatureEncoding::Base64,
    )
    .expect("sign notification");
    params.insert("sign", sign);
    params.insert("sign_type", "RSA");
    params.to_form_pairs().into_iter().collect()
}

/// Form-encode callback parameters the way the gateway puts them on the URL.
pub(crate) fn encode_query(params: &HashMap<String, String>) -> RawQuery {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    RawQuery(Some(query))
}

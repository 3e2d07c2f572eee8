// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{epay::EpayClient, settlement::OrderSettlement};

#[derive(Clone)]
pub struct AppState {
    pub epay: EpayClient,
    pub settlement: Arc<dyn OrderSettlement>,
}

impl AppState {
    pub fn new(epay: EpayClient, settlement: Arc<dyn OrderSettlement>) -> Self {
        Self { epay, settlement }
    }
}

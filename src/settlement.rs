// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Order settlement port.
//!
//! The notify handler calls [`OrderSettlement::settle`] once a notification
//! has been accepted. Crediting the user's balance lives behind this trait,
//! outside the gateway client. The gateway re-delivers notifications until it
//! sees `success`, so implementations must be idempotent per `out_trade_no`.

use async_trait::async_trait;
use tracing::info;

use crate::epay::PaymentNotice;

#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("Settlement rejected: {0}")]
    Rejected(String),

    #[error("Settlement backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait OrderSettlement: Send + Sync {
    async fn settle(&self, notice: &PaymentNotice) -> Result<(), SettlementError>;
}

/// Settlement that only records accepted payments in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSettlement;

#[async_trait]
impl OrderSettlement for LoggingSettlement {
    async fn settle(&self, notice: &PaymentNotice) -> Result<(), SettlementError> {
        info!(
            out_trade_no = %notice.out_trade_no,
            trade_no = %notice.trade_no,
            money = ?notice.money,
            payment_type = ?notice.payment_type,
            "Payment accepted for settlement"
        );
        Ok(())
    }
}

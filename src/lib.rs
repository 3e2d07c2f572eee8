// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Epay Gateway - Signed Payment Gateway Client and Callback Service
//!
//! This crate talks to an "epay"-style payment aggregator: it signs outbound
//! payment requests with the merchant's RSA key and verifies everything the
//! gateway sends back (API responses, async notifications, browser returns)
//! against the platform's public key with a replay window.
//!
//! ## Modules
//!
//! - `epay` - Canonicalization, RSA signing, gateway client and callback checks
//! - `api` - HTTP API handlers (Axum)
//! - `config` - Environment configuration
//! - `settlement` - Order settlement port driven by accepted notifications

pub mod api;
pub mod config;
pub mod epay;
pub mod error;
pub mod models;
pub mod settlement;
pub mod state;

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup; key material is never compiled in.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `EPAY_API_URL` | Gateway base URL | Required |
//! | `EPAY_PID` | Merchant ID | Required |
//! | `EPAY_PLATFORM_PUBLIC_KEY` | Gateway public key body | Required (or `_PATH`) |
//! | `EPAY_PLATFORM_PUBLIC_KEY_PATH` | File holding the gateway public key | - |
//! | `EPAY_MERCHANT_PRIVATE_KEY` | Merchant private key body | Required (or `_PATH`) |
//! | `EPAY_MERCHANT_PRIVATE_KEY_PATH` | File holding the merchant private key | - |
//! | `EPAY_NOTIFY_URL` | Async notification URL sent with each request | Optional |
//! | `EPAY_RETURN_URL` | Browser return URL sent with each request | Optional |
//! | `EPAY_SIGNATURE_ENCODING` | `base64` or `hex` | `base64` |
//! | `EPAY_TIMEOUT_SECS` | Gateway request timeout | `10` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port (must parse as a port number) | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{fmt, fs, time::Duration};

use crate::epay::{transport::DEFAULT_TIMEOUT, Credentials, EpayError, SignatureEncoding};

pub const EPAY_API_URL_ENV: &str = "EPAY_API_URL";
pub const EPAY_PID_ENV: &str = "EPAY_PID";
pub const EPAY_PLATFORM_PUBLIC_KEY_ENV: &str = "EPAY_PLATFORM_PUBLIC_KEY";
pub const EPAY_PLATFORM_PUBLIC_KEY_PATH_ENV: &str = "EPAY_PLATFORM_PUBLIC_KEY_PATH";
pub const EPAY_MERCHANT_PRIVATE_KEY_ENV: &str = "EPAY_MERCHANT_PRIVATE_KEY";
pub const EPAY_MERCHANT_PRIVATE_KEY_PATH_ENV: &str = "EPAY_MERCHANT_PRIVATE_KEY_PATH";
pub const EPAY_NOTIFY_URL_ENV: &str = "EPAY_NOTIFY_URL";
pub const EPAY_RETURN_URL_ENV: &str = "EPAY_RETURN_URL";
pub const EPAY_SIGNATURE_ENCODING_ENV: &str = "EPAY_SIGNATURE_ENCODING";
pub const EPAY_TIMEOUT_SECS_ENV: &str = "EPAY_TIMEOUT_SECS";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Gateway settings read from the environment.
#[derive(Clone)]
pub struct GatewayConfig {
    pub api_url: String,
    pub pid: String,
    pub platform_public_key: String,
    pub merchant_private_key: String,
    pub notify_url: Option<String>,
    pub return_url: Option<String>,
    pub encoding: SignatureEncoding,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, EpayError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EpayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource { lookup };

        let encoding = match env.optional(EPAY_SIGNATURE_ENCODING_ENV) {
            Some(raw) => raw.parse()?,
            None => SignatureEncoding::default(),
        };

        let timeout = match env.optional(EPAY_TIMEOUT_SECS_ENV) {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    EpayError::Configuration(format!(
                        "{EPAY_TIMEOUT_SECS_ENV} must be a positive integer, got {raw:?}"
                    ))
                })?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_url: env.required(EPAY_API_URL_ENV)?,
            pid: env.required(EPAY_PID_ENV)?,
            platform_public_key: env
                .key(EPAY_PLATFORM_PUBLIC_KEY_ENV, EPAY_PLATFORM_PUBLIC_KEY_PATH_ENV)?,
            merchant_private_key: env
                .key(EPAY_MERCHANT_PRIVATE_KEY_ENV, EPAY_MERCHANT_PRIVATE_KEY_PATH_ENV)?,
            notify_url: env.optional(EPAY_NOTIFY_URL_ENV),
            return_url: env.optional(EPAY_RETURN_URL_ENV),
            encoding,
            timeout,
        })
    }

    /// Validate key material and build immutable client credentials.
    pub fn credentials(&self) -> Result<Credentials, EpayError> {
        let mut creds = Credentials::new(
            &self.api_url,
            &self.pid,
            &self.merchant_private_key,
            &self.platform_public_key,
        )?
        .with_encoding(self.encoding);
        if let Some(url) = &self.notify_url {
            creds = creds.with_notify_url(url);
        }
        if let Some(url) = &self.return_url {
            creds = creds.with_return_url(url);
        }
        Ok(creds)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_url", &self.api_url)
            .field("pid", &self.pid)
            .field("notify_url", &self.notify_url)
            .field("return_url", &self.return_url)
            .field("encoding", &self.encoding)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub json_logs: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, EpayError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source. An unset `PORT` means
    /// [`DEFAULT_PORT`]; a set but unparsable one is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EpayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource { lookup };

        let port = match env.optional(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                EpayError::Configuration(format!(
                    "{PORT_ENV} must be a port number, got {raw:?}"
                ))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: env.or_default(HOST_ENV, DEFAULT_HOST),
            port,
            json_logs: env
                .optional(LOG_FORMAT_ENV)
                .is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

struct EnvSource<F> {
    lookup: F,
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &str) -> Result<String, EpayError> {
        self.optional(name)
            .ok_or_else(|| EpayError::Configuration(format!("{name} is not set")))
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    /// Key body from `inline_var`, or read from the file named by `path_var`.
    fn key(&self, inline_var: &str, path_var: &str) -> Result<String, EpayError> {
        if let Some(key) = self.optional(inline_var) {
            return Ok(key);
        }

        let path = self.optional(path_var).ok_or_else(|| {
            EpayError::Configuration(format!("{inline_var} or {path_var} must be set"))
        })?;
        let contents = fs::read_to_string(&path)
            .map_err(|e| EpayError::Configuration(format!("failed to read {path}: {e}")))?;
        let trimmed = contents.trim().to_string();
        if trimmed.is_empty() {
            return Err(EpayError::Configuration(format!(
                "{path_var} points to an empty file: {path}"
            )));
        }
        Ok(trimmed)
    }
}

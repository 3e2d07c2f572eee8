// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway data model: credentials, parameter sets and responses.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::{
    error::EpayError,
    signing::{self, SignatureEncoding},
};

/// Signature algorithm tag sent as `sign_type` on every request.
pub const SIGN_TYPE: &str = "RSA";

/// Trade status reported by the gateway once a payment has settled.
pub const TRADE_SUCCESS: &str = "TRADE_SUCCESS";

// =============================================================================
// Credentials
// =============================================================================

/// Merchant credentials for one gateway account.
///
/// Key material is validated when the credentials are built, so a client
/// holding them can only fail to sign for reasons unrelated to configuration.
#[derive(Clone)]
pub struct Credentials {
    api_url: String,
    pid: String,
    merchant_private_key: String,
    platform_public_key: String,
    notify_url: Option<String>,
    return_url: Option<String>,
    encoding: SignatureEncoding,
}

impl Credentials {
    pub fn new(
        api_url: impl Into<String>,
        pid: impl Into<String>,
        merchant_private_key: impl Into<String>,
        platform_public_key: impl Into<String>,
    ) -> Result<Self, EpayError> {
        let api_url = normalize_base_url(&api_url.into())?;
        let pid = pid.into().trim().to_string();
        if pid.is_empty() {
            return Err(EpayError::Configuration("pid must not be empty".to_string()));
        }

        let merchant_private_key = merchant_private_key.into();
        signing::parse_private_key(&merchant_private_key)
            .map_err(|e| EpayError::Configuration(format!("merchant private key: {e}")))?;

        let platform_public_key = platform_public_key.into();
        signing::parse_public_key(&platform_public_key)
            .map_err(|e| EpayError::Configuration(format!("platform public key: {e}")))?;

        Ok(Self {
            api_url,
            pid,
            merchant_private_key,
            platform_public_key,
            notify_url: None,
            return_url: None,
            encoding: SignatureEncoding::default(),
        })
    }

    /// Inject `notify_url` into every signed request.
    pub fn with_notify_url(mut self, url: impl Into<String>) -> Self {
        self.notify_url = non_empty(url.into());
        self
    }

    /// Inject `return_url` into every signed request.
    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = non_empty(url.into());
        self
    }

    pub fn with_encoding(mut self, encoding: SignatureEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Gateway base URL, always ending with `/`.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn pid(&self) -> &str {
        &self.pid
    }

    pub fn merchant_private_key(&self) -> &str {
        &self.merchant_private_key
    }

    pub fn platform_public_key(&self) -> &str {
        &self.platform_public_key
    }

    pub fn notify_url(&self) -> Option<&str> {
        self.notify_url.as_deref()
    }

    pub fn return_url(&self) -> Option<&str> {
        self.return_url.as_deref()
    }

    pub fn encoding(&self) -> SignatureEncoding {
        self.encoding
    }

    pub fn sign_type(&self) -> &'static str {
        SIGN_TYPE
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_url", &self.api_url)
            .field("pid", &self.pid)
            .field("merchant_private_key", &"<redacted>")
            .field("platform_public_key", &"<redacted>")
            .field("notify_url", &self.notify_url)
            .field("return_url", &self.return_url)
            .field("encoding", &self.encoding)
            .finish()
    }
}

fn normalize_base_url(raw: &str) -> Result<String, EpayError> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| EpayError::Configuration(format!("invalid gateway URL {trimmed:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(EpayError::Configuration(format!(
            "gateway URL must be http(s): {trimmed}"
        )));
    }
    Ok(format!("{}/", trimmed.trim_end_matches('/')))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// Parameter Set
// =============================================================================

/// Key/value parameters exchanged with the gateway.
///
/// Keys are held in byte order, which is the order the canonical string uses.
/// Values are JSON scalars; arrays and objects may be present (the gateway
/// sends them occasionally) but never take part in signing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<String, Value>);

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded query-string or form pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect()
    }

    /// Build from a JSON object. Returns `None` for any other JSON value.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(map.into_iter().collect()),
            _ => None,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Scalar value rendered as text, the way it appears on the wire.
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(scalar_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Scalar entries as text pairs for form bodies and query strings.
    pub fn to_form_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(k, v)| scalar_text(v).map(|text| (k.clone(), text)))
            .collect()
    }
}

impl FromIterator<(String, Value)> for ParameterSet {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Text form of a scalar JSON value; `None` for null, arrays and objects.
///
/// Numbers render the way the gateway's own signer prints them (JavaScript
/// `Number#toString`), so `10.0` is `10` and `1e2` is `100`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => float_text(f),
        _ => n.to_string(),
    }
}

fn float_text(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let abs = f.abs();
    if !(1e-6..1e21).contains(&abs) {
        // Exponent form, with an explicit `+` on positive exponents.
        let text = format!("{f:e}");
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        };
    }
    if f.fract() == 0.0 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

// =============================================================================
// Gateway Response
// =============================================================================

/// Parsed JSON body returned by the gateway API.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    code: i64,
    fields: ParameterSet,
}

impl GatewayResponse {
    /// Parse a raw response body. The body must be a JSON object with an
    /// integer `code` (number or numeric string).
    pub fn from_body(body: &str) -> Result<Self, EpayError> {
        let value: Value = serde_json::from_str(body).map_err(|e| {
            EpayError::InvalidResponse(format!("body is not JSON ({e}): {}", truncate(body)))
        })?;
        let fields = ParameterSet::from_json(value).ok_or_else(|| {
            EpayError::InvalidResponse("body is not a JSON object".to_string())
        })?;
        let code = fields
            .get("code")
            .and_then(|v| match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .ok_or_else(|| EpayError::InvalidResponse("missing integer code".to_string()))?;
        Ok(Self { code, fields })
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Every field of the response, including `sign`.
    pub fn fields(&self) -> &ParameterSet {
        &self.fields
    }

    pub fn msg(&self) -> Option<String> {
        self.fields.get_text("msg")
    }

    pub fn sign(&self) -> Option<String> {
        self.fields.get_text("sign")
    }

    pub fn timestamp(&self) -> Option<String> {
        self.fields.get_text("timestamp")
    }

    pub fn trade_no(&self) -> Option<String> {
        self.fields.get_text("trade_no")
    }

    pub fn out_trade_no(&self) -> Option<String> {
        self.fields.get_text("out_trade_no")
    }

    pub fn trade_status(&self) -> Option<String> {
        self.fields.get_text("trade_status")
    }

    pub fn money(&self) -> Option<String> {
        self.fields.get_text("money")
    }

    pub fn payment_type(&self) -> Option<String> {
        self.fields.get_text("type")
    }

    /// Whether the order described by this response has settled.
    ///
    /// The query endpoint reports `status = 1` for paid orders; notifications
    /// and newer responses carry `trade_status = TRADE_SUCCESS`.
    pub fn is_paid(&self) -> bool {
        self.trade_status().as_deref() == Some(TRADE_SUCCESS)
            || self.fields.get_text("status").as_deref().map(str::trim) == Some("1")
    }
}

fn truncate(body: &str) -> String {
    const LIMIT: usize = 200;
    match body.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

// =============================================================================
// Payment Type
// =============================================================================

/// Payment channels offered by the gateway cashier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Alipay,
    Wxpay,
    Qqpay,
    Bank,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Alipay => "alipay",
            PaymentType::Wxpay => "wxpay",
            PaymentType::Qqpay => "qqpay",
            PaymentType::Bank => "bank",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentType::Alipay => "Alipay",
            PaymentType::Wxpay => "WeChat Pay",
            PaymentType::Qqpay => "QQ Wallet",
            PaymentType::Bank => "Online Banking",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = EpayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alipay" => Ok(PaymentType::Alipay),
            "wxpay" => Ok(PaymentType::Wxpay),
            "qqpay" => Ok(PaymentType::Qqpay),
            "bank" => Ok(PaymentType::Bank),
            other => Err(EpayError::InvalidRequest(format!(
                "unsupported payment type: {other}"
            ))),
        }
    }
}

// =============================================================================
// Amounts
// =============================================================================

/// Validate a money amount and normalize it to two decimal places.
///
/// Accepts a positive decimal with at most two fraction digits, e.g. `"10"`,
/// `"10.5"`, `"10.50"`; returns `"10.00"`, `"10.50"`, `"10.50"`.
pub fn normalize_amount(amount: &str) -> Result<String, EpayError> {
    let invalid = || EpayError::InvalidRequest("money must be a valid positive number".to_string());

    let trimmed = amount.trim();
    let (whole_part, fraction_part) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole_part.is_empty() || !whole_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if !fraction_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction_part.len() > 2 {
        return Err(EpayError::InvalidRequest(
            "money must have at most 2 decimal places".to_string(),
        ));
    }

    let whole = whole_part
        .parse::<u64>()
        .map_err(|_| EpayError::InvalidRequest("money is too large".to_string()))?;
    let fraction = match fraction_part.len() {
        0 => 0,
        1 => fraction_part.parse::<u64>().map_err(|_| invalid())? * 10,
        _ => fraction_part.parse::<u64>().map_err(|_| invalid())?,
    };

    let minor = whole
        .checked_mul(100)
        .and_then(|base| base.checked_add(fraction))
        .ok_or_else(|| EpayError::InvalidRequest("money is too large".to_string()))?;
    if minor == 0 {
        return Err(invalid());
    }

    Ok(format!("{whole}.{fraction:02}"))
}

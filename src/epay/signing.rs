// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canonicalization and RSA-SHA256 signing for gateway messages.
//!
//! Outbound signing and inbound verification both go through
//! [`canonicalize`]; the gateway rebuilds exactly the same string on its side,
//! so any divergence here makes every signature fail.
//!
//! Keys are configured as bare base64 bodies (no armor). They are wrapped in
//! `BEGIN/END PRIVATE KEY` or `BEGIN/END PUBLIC KEY` armor with 64 character
//! lines before parsing. Already-armored keys are accepted unchanged.

use std::{fmt, str::FromStr};

use base64ct::{Base64, Encoding};
use rsa::{
    pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
    pkcs1v15::{Signature, SigningKey, VerifyingKey},
    pkcs8::{DecodePrivateKey, DecodePublicKey},
    signature::{SignatureEncoding as _, Signer, Verifier},
    RsaPrivateKey, RsaPublicKey,
};
use sha2::Sha256;

use super::{error::EpayError, types::ParameterSet};

/// Signature algorithm identifier used by the gateway.
pub const ALGORITHM: &str = "SHA256withRSA";

const PEM_LINE_WIDTH: usize = 64;
const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// Text encoding of the raw signature bytes in the `sign` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureEncoding {
    #[default]
    Base64,
    Hex,
}

impl SignatureEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureEncoding::Base64 => "base64",
            SignatureEncoding::Hex => "hex",
        }
    }

    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            SignatureEncoding::Base64 => Base64::encode_string(bytes),
            SignatureEncoding::Hex => hex::encode(bytes),
        }
    }

    /// Decode signature text. `None` when the text is not valid for this
    /// encoding.
    pub fn decode(&self, text: &str) -> Option<Vec<u8>> {
        let text = text.trim();
        match self {
            SignatureEncoding::Base64 => Base64::decode_vec(text).ok(),
            SignatureEncoding::Hex => hex::decode(text).ok(),
        }
    }
}

impl fmt::Display for SignatureEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureEncoding {
    type Err = EpayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base64" => Ok(SignatureEncoding::Base64),
            "hex" => Ok(SignatureEncoding::Hex),
            other => Err(EpayError::Configuration(format!(
                "unknown signature encoding: {other} (expected base64 or hex)"
            ))),
        }
    }
}

/// Build the canonical signable string for a parameter set.
///
/// Skips `sign`, `sign_type`, arrays, objects, nulls and values that are
/// empty after trimming. Remaining entries are joined as `key=value` with `&`
/// in byte order of the keys.
pub fn canonicalize(params: &ParameterSet) -> String {
    // ParameterSet iterates in key byte order already.
    params
        .iter()
        .filter(|(key, _)| key.as_str() != "sign" && key.as_str() != "sign_type")
        .filter_map(|(key, value)| {
            super::types::scalar_text(value)
                .filter(|text| !text.trim().is_empty())
                .map(|text| format!("{key}={text}"))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Wrap a bare base64 key body in PEM armor.
///
/// Whitespace inside the body is dropped and the body is re-wrapped at 64
/// characters. Input that already carries armor is returned trimmed. Literal
/// `\n` sequences (common in environment variables) are unescaped first.
pub fn armor(key: &str, label: &str) -> String {
    let key = key.replace("\\n", "\n");
    if key.contains("-----BEGIN") {
        return key.trim().to_string();
    }

    let body: Vec<char> = key.chars().filter(|c| !c.is_whitespace()).collect();
    let lines: Vec<String> = body
        .chunks(PEM_LINE_WIDTH)
        .map(|line| line.iter().collect())
        .collect();

    format!(
        "-----BEGIN {label}-----\n{}\n-----END {label}-----",
        lines.join("\n")
    )
}

/// Parse the merchant private key (PKCS#8, PKCS#1 accepted as fallback).
pub fn parse_private_key(key: &str) -> Result<RsaPrivateKey, String> {
    let block = pem::parse(armor(key, PRIVATE_KEY_LABEL))
        .map_err(|e| format!("invalid PEM: {e}"))?;

    RsaPrivateKey::from_pkcs8_der(block.contents())
        .or_else(|_| RsaPrivateKey::from_pkcs1_der(block.contents()))
        .map_err(|e| format!("invalid RSA private key: {e}"))
}

/// Parse the gateway public key (SPKI, PKCS#1 accepted as fallback).
pub fn parse_public_key(key: &str) -> Result<RsaPublicKey, String> {
    let block = pem::parse(armor(key, PUBLIC_KEY_LABEL))
        .map_err(|e| format!("invalid PEM: {e}"))?;

    RsaPublicKey::from_public_key_der(block.contents())
        .or_else(|_| RsaPublicKey::from_pkcs1_der(block.contents()))
        .map_err(|e| format!("invalid RSA public key: {e}"))
}

/// Sign a canonical string with the merchant private key.
///
/// Fails with [`EpayError::Signing`] when the key cannot be parsed; never
/// returns a partial signature.
pub fn sign(
    private_key: &str,
    content: &str,
    encoding: SignatureEncoding,
) -> Result<String, EpayError> {
    let key = parse_private_key(private_key).map_err(EpayError::Signing)?;
    let signing_key = SigningKey::<Sha256>::new(key);
    let signature = signing_key
        .try_sign(content.as_bytes())
        .map_err(|e| EpayError::Signing(e.to_string()))?;
    Ok(encoding.encode(&signature.to_bytes()))
}

/// Verify a gateway signature over a canonical string.
///
/// Returns `Ok(false)` for any mismatch, including signature text that does
/// not decode. Fails with [`EpayError::Verification`] only when the public
/// key itself is unusable.
pub fn verify(
    public_key: &str,
    content: &str,
    signature: &str,
    encoding: SignatureEncoding,
) -> Result<bool, EpayError> {
    let key = parse_public_key(public_key).map_err(EpayError::Verification)?;

    let Some(bytes) = encoding.decode(signature) else {
        return Ok(false);
    };
    let Ok(signature) = Signature::try_from(bytes.as_slice()) else {
        return Ok(false);
    };

    let verifying_key = VerifyingKey::<Sha256>::new(key);
    Ok(verifying_key.verify(content.as_bytes(), &signature).is_ok())
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Throwaway RSA key pairs for unit tests, generated once per test binary.

use std::sync::OnceLock;

use base64ct::{Base64, Encoding};
use rsa::{
    pkcs8::{EncodePrivateKey, EncodePublicKey},
    RsaPrivateKey,
};

pub struct TestKeyPair {
    /// PKCS#8 DER as bare base64 (no armor), as the gateway console exports it.
    pub private_body: String,
    /// SPKI DER as bare base64 (no armor).
    pub public_body: String,
}

fn generate() -> TestKeyPair {
    let mut rng = rand::thread_rng();
    let key = RsaPrivateKey::new(&mut rng, 2048).expect("generate RSA key");
    let private_der = key.to_pkcs8_der().expect("encode PKCS#8");
    let public_der = key
        .to_public_key()
        .to_public_key_der()
        .expect("encode SPKI");

    TestKeyPair {
        private_body: Base64::encode_string(private_der.as_bytes()),
        public_body: Base64::encode_string(public_der.as_bytes()),
    }
}

/// Merchant key pair (signs requests).
pub fn merchant_keys() -> &'static TestKeyPair {
    static KEYS: OnceLock<TestKeyPair> = OnceLock::new();
    KEYS.get_or_init(generate)
}

/// Gateway key pair (signs responses and notifications).
pub fn gateway_keys() -> &'static TestKeyPair {
    static KEYS: OnceLock<TestKeyPair> = OnceLock::new();
    KEYS.get_or_init(generate)
}

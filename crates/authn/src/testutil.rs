//! Shared test utilities for verification testing.
//!
//! This module provides helpers for generating RSA key pairs, building JWKS
//! documents, signing test tokens, crafting raw tokens (for malformed-input
//! testing), and stub [`KeySetSource`] implementations. It is feature-gated
//! behind `testutil` to prevent leaking into production builds.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! schema-api-authn = { path = "../authn", features = ["testutil"] }
//! ```

use std::sync::{
    OnceLock,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, jwk::JwkSet};
use rsa::{RsaPrivateKey, pkcs1::EncodeRsaPrivateKey, traits::PublicKeyParts};
use serde_json::json;

use crate::{error::AuthError, jwks::KeySetSource};

/// An RSA key pair usable both for signing test tokens and for publishing
/// the matching public key in a JWKS document.
pub struct TestKeyPair {
    encoding_key: EncodingKey,
    /// Public modulus, base64url without padding.
    n: String,
    /// Public exponent, base64url without padding.
    e: String,
}

impl TestKeyPair {
    /// Generates a fresh RSA-2048 key pair.
    ///
    /// Key generation is slow; prefer [`shared_keypair`] unless the test
    /// needs a second, non-matching key.
    ///
    /// # Panics
    ///
    /// Panics if key generation or encoding fails.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).expect("generate RSA key");
        let der = private.to_pkcs1_der().expect("encode RSA key");
        let n = URL_SAFE_NO_PAD.encode(private.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(private.e().to_bytes_be());
        Self { encoding_key: EncodingKey::from_rsa_der(der.as_bytes()), n, e }
    }

    /// Builds a JWKS document containing this key pair's public key under
    /// the given `kid`.
    ///
    /// # Panics
    ///
    /// Panics if the document fails to deserialize (should not happen with
    /// valid inputs).
    #[must_use]
    pub fn key_set(&self, kid: &str) -> JwkSet {
        serde_json::from_value(json!({
            "keys": [{
                "kty": "RSA",
                "use": "sig",
                "alg": "RS256",
                "kid": kid,
                "n": self.n,
                "e": self.e,
            }]
        }))
        .expect("valid JWKS document")
    }

    /// Signs a token with arbitrary claims.
    ///
    /// The `kid` header is set so the verifier can look up the matching
    /// public key.
    ///
    /// # Panics
    ///
    /// Panics if encoding fails (should not happen with valid inputs).
    #[must_use]
    pub fn signed_token_with_claims(&self, kid: &str, claims: &serde_json::Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_owned());
        jsonwebtoken::encode(&header, claims, &self.encoding_key)
            .expect("failed to encode test token")
    }

    /// Signs a token with standard claims, expiring in 1 hour.
    #[must_use]
    pub fn signed_token(&self, kid: &str, issuer: &str) -> String {
        let now = Utc::now().timestamp();
        self.signed_token_with_exp(kid, issuer, now + 3600)
    }

    /// Signs a token with standard claims and an explicit expiry.
    ///
    /// Note the verifier applies the default clock leeway (60 seconds), so
    /// an "expired" token should be expired by well over a minute.
    #[must_use]
    pub fn signed_token_with_exp(&self, kid: &str, issuer: &str, exp: i64) -> String {
        let claims = json!({
            "iss": issuer,
            "sub": "user_test123",
            "exp": exp,
            "iat": Utc::now().timestamp(),
            "org_id": "acct_test123",
            "email": "test@example.com",
        });
        self.signed_token_with_claims(kid, &claims)
    }
}

/// Returns a process-wide shared key pair.
///
/// RSA key generation takes noticeable time; most tests can share one pair.
pub fn shared_keypair() -> &'static TestKeyPair {
    static KEYPAIR: OnceLock<TestKeyPair> = OnceLock::new();
    KEYPAIR.get_or_init(TestKeyPair::generate)
}

/// Creates a raw token string from arbitrary header and payload JSON.
///
/// The resulting token has the structure `{header_b64}.{payload_b64}.` with
/// an empty signature. This is useful for testing rejection of malformed or
/// attack tokens (e.g., `alg: "none"`, missing `kid`).
///
/// # Panics
///
/// Panics if JSON serialization fails.
#[must_use]
pub fn craft_raw_token(
    header_json: &serde_json::Value,
    payload_json: &serde_json::Value,
) -> String {
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header_json).expect("header json"));
    let payload_b64 =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload_json).expect("payload json"));
    format!("{header_b64}.{payload_b64}.")
}

/// A [`KeySetSource`] that serves a fixed key set and counts fetches.
pub struct StaticKeySetSource {
    keys: JwkSet,
    fetches: AtomicUsize,
}

impl StaticKeySetSource {
    /// Creates a source serving the given key set.
    #[must_use]
    pub fn new(keys: JwkSet) -> Self {
        Self { keys, fetches: AtomicUsize::new(0) }
    }

    /// Number of times [`fetch`](KeySetSource::fetch) has been called.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySetSource for StaticKeySetSource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.keys.clone())
    }
}

/// A [`KeySetSource`] whose fetches always fail.
pub struct FailingKeySetSource;

#[async_trait]
impl KeySetSource for FailingKeySetSource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        Err(AuthError::jwks_unavailable("key source offline"))
    }
}

/// Asserts that a `Result<T, AuthError>` is an `Err` matching the given
/// [`AuthError`] variant.
///
/// On failure, prints the expected variant and the actual result.
#[macro_export]
macro_rules! assert_auth_error {
    ($result:expr, $variant:ident) => {
        assert!(
            matches!($result, Err($crate::error::AuthError::$variant { .. })),
            "expected AuthError::{}, got: {:?}",
            stringify!($variant),
            $result,
        );
    };
}

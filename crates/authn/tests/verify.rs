//! End-to-end verification tests with a stubbed key-set source.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use schema_api_authn::{
    AuthConfig, AuthError, KeySetSource, TokenVerifier, assert_auth_error,
    testutil::{FailingKeySetSource, StaticKeySetSource, TestKeyPair, craft_raw_token, shared_keypair},
    verifier::{TEST_ACCOUNT_ID, TEST_USER_ID},
};
use serde_json::json;

const ISSUER: &str = "https://idp.example.com";
const KID: &str = "key-2024-001";

fn verifier_with(source: Arc<dyn KeySetSource>) -> TokenVerifier {
    let config = AuthConfig::builder()
        .with_jwks_url("https://idp.example.com/jwks.json")
        .with_issuer(ISSUER)
        .build()
        .unwrap();
    TokenVerifier::with_key_source(&config, source, Duration::from_secs(60))
}

fn verifier() -> TokenVerifier {
    verifier_with(Arc::new(StaticKeySetSource::new(shared_keypair().key_set(KID))))
}

#[tokio::test]
async fn verify_valid_token_returns_identity() {
    let token = shared_keypair().signed_token(KID, ISSUER);

    let identity = verifier().verify(&token).await.unwrap();
    assert_eq!(identity.user_id, "user_test123");
    assert_eq!(identity.account_id, "acct_test123");
    assert_eq!(identity.email.as_deref(), Some("test@example.com"));
}

#[tokio::test]
async fn verify_without_org_claim_falls_back_to_subject() {
    let claims = json!({
        "iss": ISSUER,
        "sub": "user_solo",
        "exp": Utc::now().timestamp() + 3600,
        "iat": Utc::now().timestamp(),
    });
    let token = shared_keypair().signed_token_with_claims(KID, &claims);

    let identity = verifier().verify(&token).await.unwrap();
    assert_eq!(identity.user_id, "user_solo");
    assert_eq!(identity.account_id, "user_solo");
    assert!(identity.email.is_none());
}

#[tokio::test]
async fn verify_expired_token_rejected() {
    // Well past the verifier's 60-second clock leeway.
    let exp = Utc::now().timestamp() - 7200;
    let token = shared_keypair().signed_token_with_exp(KID, ISSUER, exp);

    let result = verifier().verify(&token).await;
    assert_auth_error!(result, TokenExpired);
}

#[tokio::test]
async fn verify_wrong_issuer_rejected() {
    let token = shared_keypair().signed_token(KID, "https://evil.example.com");

    let result = verifier().verify(&token).await;
    assert_auth_error!(result, InvalidIssuer);
}

#[tokio::test]
async fn verify_unknown_kid_rejected() {
    let token = shared_keypair().signed_token("ghost-key", ISSUER);

    let result = verifier().verify(&token).await;
    assert!(
        matches!(&result, Err(AuthError::KeyNotFound { kid }) if kid == "ghost-key"),
        "expected KeyNotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn verify_token_signed_by_other_key_rejected() {
    // Key set publishes the shared key, but the token is signed by a
    // different key under the same kid.
    let imposter = TestKeyPair::generate();
    let token = imposter.signed_token(KID, ISSUER);

    let result = verifier().verify(&token).await;
    assert_auth_error!(result, AuthenticationFailed);
}

#[tokio::test]
async fn verify_missing_subject_rejected() {
    let claims = json!({
        "iss": ISSUER,
        "exp": Utc::now().timestamp() + 3600,
        "org_id": "acct_test123",
    });
    let token = shared_keypair().signed_token_with_claims(KID, &claims);

    let result = verifier().verify(&token).await;
    assert_auth_error!(result, AuthenticationFailed);
}

#[tokio::test]
async fn verify_header_without_kid_is_malformed() {
    let token = craft_raw_token(&json!({"alg": "RS256", "typ": "JWT"}), &json!({"sub": "x"}));

    let result = verifier().verify(&token).await;
    assert_auth_error!(result, InvalidTokenFormat);
}

#[tokio::test]
async fn verify_alg_none_is_malformed() {
    let token = craft_raw_token(
        &json!({"alg": "none", "typ": "JWT", "kid": KID}),
        &json!({"iss": ISSUER, "sub": "user_x", "exp": Utc::now().timestamp() + 3600}),
    );

    let result = verifier().verify(&token).await;
    assert_auth_error!(result, InvalidTokenFormat);
}

#[tokio::test]
async fn verify_key_source_outage_surfaces_unavailable() {
    let verifier = verifier_with(Arc::new(FailingKeySetSource));
    let token = shared_keypair().signed_token(KID, ISSUER);

    let result = verifier.verify(&token).await;
    assert_auth_error!(result, JwksUnavailable);
}

#[tokio::test]
async fn verify_reuses_cached_key_set_within_ttl() {
    let source = Arc::new(StaticKeySetSource::new(shared_keypair().key_set(KID)));
    let verifier = verifier_with(source.clone());
    let token = shared_keypair().signed_token(KID, ISSUER);

    verifier.verify(&token).await.unwrap();
    verifier.verify(&token).await.unwrap();

    assert_eq!(source.fetch_count(), 1, "second verification must hit the cache");
}

#[tokio::test]
async fn verify_bypass_mode_accepts_anything() {
    let config = AuthConfig::builder().with_require_auth(false).build().unwrap();
    let verifier = TokenVerifier::new(&config).unwrap();

    for token in ["", "garbage", "a.b.c"] {
        let identity = verifier.verify(token).await.unwrap();
        assert_eq!(identity.user_id, TEST_USER_ID);
        assert_eq!(identity.account_id, TEST_ACCOUNT_ID);
    }
}

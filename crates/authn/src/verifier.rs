//! Bearer-token verification.
//!
//! This module provides [`TokenVerifier`], which validates a caller's signed
//! credential against the identity provider's published key set and maps its
//! claims to a [`CallerIdentity`].
//!
//! # Example
//!
//! ```no_run
//! use schema_api_authn::{config::AuthConfig, verifier::TokenVerifier};
//!
//! # async fn example(token: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::from_env()?;
//! let verifier = TokenVerifier::new(&config)?;
//!
//! let identity = verifier.verify(token).await?;
//! println!("caller: {} in account {}", identity.user_id, identity.account_id);
//! # Ok(())
//! # }
//! ```

use std::{sync::Arc, time::Duration};

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

use crate::{
    claims::{CallerIdentity, TokenClaims},
    config::AuthConfig,
    error::AuthError,
    jwks::{HttpKeySetSource, JwksCache, KEY_SET_TTL, KeySetSource},
};

/// User id returned in bypass mode.
pub const TEST_USER_ID: &str = "user_test123";

/// Account id returned in bypass mode.
pub const TEST_ACCOUNT_ID: &str = "acct_test123";

/// Email returned in bypass mode.
pub const TEST_EMAIL: &str = "test@example.com";

/// Verifies bearer tokens issued by the identity provider.
///
/// Verification is stateless per call; the only persistent state is the key
/// cache's TTL window. When the configuration disables authentication
/// (`require_auth == false`), `verify` returns a fixed test identity without
/// inspecting the credential and the key set is never consulted — an explicit
/// bypass intended only for local and test environments.
pub struct TokenVerifier {
    issuer: String,
    require_auth: bool,
    keys: JwksCache,
}

impl TokenVerifier {
    /// Creates a verifier backed by the identity provider's JWKS endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let source = Arc::new(HttpKeySetSource::new(config.jwks_url())?);
        Ok(Self::with_key_source(config, source, KEY_SET_TTL))
    }

    /// Creates a verifier with a custom key-set source and cache TTL.
    ///
    /// Used by tests to substitute a stub source; production code should use
    /// [`new`](Self::new).
    #[must_use]
    pub fn with_key_source(
        config: &AuthConfig,
        source: Arc<dyn KeySetSource>,
        ttl: Duration,
    ) -> Self {
        Self {
            issuer: config.issuer().to_owned(),
            require_auth: config.require_auth(),
            keys: JwksCache::with_ttl(source, ttl),
        }
    }

    /// The fixed identity returned in bypass mode.
    #[must_use]
    pub fn test_identity() -> CallerIdentity {
        CallerIdentity {
            user_id: TEST_USER_ID.to_owned(),
            account_id: TEST_ACCOUNT_ID.to_owned(),
            email: Some(TEST_EMAIL.to_owned()),
        }
    }

    /// Verifies a bearer token and returns the caller's identity.
    ///
    /// The pipeline:
    /// 1. Bypass mode → fixed test identity, credential not inspected.
    /// 2. Decode the token header and extract the key id (`kid`).
    /// 3. Look the key up in the cached key set.
    /// 4. Verify the RS256 signature, the issuer claim and the expiry. The
    ///    audience claim is intentionally not validated — the provider does
    ///    not reliably populate it.
    /// 5. Map the verified claims to a [`CallerIdentity`].
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidTokenFormat`] — the header cannot be decoded or carries no `kid`
    /// - [`AuthError::KeyNotFound`] — no key in the current set matches `kid`
    /// - [`AuthError::TokenExpired`] — the expiry claim is in the past
    /// - [`AuthError::InvalidIssuer`] — the issuer claim does not match
    /// - [`AuthError::AuthenticationFailed`] — signature or claims validation failed
    /// - [`AuthError::JwksUnavailable`] — the key set could not be fetched
    #[tracing::instrument(skip(self, token))]
    pub async fn verify(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        if !self.require_auth {
            tracing::debug!("verification bypass active, returning fixed test identity");
            return Ok(Self::test_identity());
        }

        let header = decode_header(token).map_err(|e| {
            AuthError::invalid_token_format(format!("failed to decode token header: {}", e))
        })?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::invalid_token_format("token header missing 'kid'"))?;

        let keys = self.keys.get_keys().await?;
        let jwk = keys.find(&kid).ok_or_else(|| AuthError::key_not_found(&kid))?;
        let decoding_key = DecodingKey::from_jwk(jwk).map_err(|e| {
            AuthError::authentication_failed(format!("unusable signing key '{}': {}", kid, e))
        })?;

        let claims = self.verify_signature(token, &decoding_key)?;
        let identity = CallerIdentity::from_claims(&claims)?;

        tracing::debug!(
            user_id = %identity.user_id,
            account_id = %identity.account_id,
            "token verified"
        );

        Ok(identity)
    }

    /// Verifies the token signature and standard claims with the given key.
    fn verify_signature(
        &self,
        token: &str,
        key: &DecodingKey,
    ) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_exp = true;
        validation.validate_aud = false;

        let token_data = decode::<TokenClaims>(token, key, &validation)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn bypass_verifier() -> TokenVerifier {
        let config = AuthConfig::builder().with_require_auth(false).build().unwrap();
        TokenVerifier::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_bypass_mode_returns_fixed_identity() {
        let verifier = bypass_verifier();

        let identity = verifier.verify("any-token").await.unwrap();
        assert_eq!(identity.user_id, TEST_USER_ID);
        assert_eq!(identity.account_id, TEST_ACCOUNT_ID);
        assert_eq!(identity.email.as_deref(), Some(TEST_EMAIL));
    }

    #[tokio::test]
    async fn test_bypass_mode_ignores_credential_content() {
        let verifier = bypass_verifier();

        // Even an empty credential produces the test identity.
        let identity = verifier.verify("").await.unwrap();
        assert_eq!(identity.user_id, TEST_USER_ID);
    }

    /// Known-bad token inputs must map to errors, never panic.
    mod malformed_inputs {
        use super::*;
        use crate::jwks::KeySetSource;
        use async_trait::async_trait;
        use jsonwebtoken::jwk::JwkSet;

        struct EmptySource;

        #[async_trait]
        impl KeySetSource for EmptySource {
            async fn fetch(&self) -> Result<JwkSet, AuthError> {
                Ok(JwkSet { keys: Vec::new() })
            }
        }

        fn strict_verifier() -> TokenVerifier {
            let config = AuthConfig::builder()
                .with_jwks_url("https://idp.example.com/jwks.json")
                .with_issuer("https://idp.example.com")
                .build()
                .unwrap();
            TokenVerifier::with_key_source(
                &config,
                Arc::new(EmptySource),
                std::time::Duration::from_secs(60),
            )
        }

        #[tokio::test]
        async fn test_empty_token_is_malformed() {
            let result = strict_verifier().verify("").await;
            assert!(matches!(result, Err(AuthError::InvalidTokenFormat(_))));
        }

        #[tokio::test]
        async fn test_plain_string_is_malformed() {
            let result = strict_verifier().verify("not-a-token").await;
            assert!(matches!(result, Err(AuthError::InvalidTokenFormat(_))));
        }

        #[tokio::test]
        async fn test_garbage_segments_are_malformed() {
            let result = strict_verifier().verify("!!!.!!!.!!!").await;
            assert!(matches!(result, Err(AuthError::InvalidTokenFormat(_))));
        }
    }
}

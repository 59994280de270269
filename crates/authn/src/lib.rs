//! # Schema API Authentication
//!
//! Bearer-token verification for the schema metadata API.
//!
//! This crate provides:
//! - **Key cache**: TTL-cached retrieval of the identity provider's signing key set (JWKS)
//! - **Token verification**: RS256 signature, issuer and expiry validation
//! - **Caller identity**: strict mapping from verified claims to `(user_id, account_id, email)`
//!
//! ## Example
//!
//! ```no_run
//! use schema_api_authn::{AuthConfig, TokenVerifier};
//!
//! # async fn example(token: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::from_env()?;
//! let verifier = TokenVerifier::new(&config)?;
//!
//! let identity = verifier.verify(token).await?;
//! println!("verified caller: {}", identity.user_id);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Token claims and caller identity.
pub mod claims;
/// Verifier configuration.
pub mod config;
/// Authentication error types.
pub mod error;
/// Remote key-set retrieval and caching.
pub mod jwks;
/// Shared test utilities (feature `testutil`).
#[cfg(feature = "testutil")]
#[allow(clippy::expect_used)]
pub mod testutil;
/// Bearer-token verification.
pub mod verifier;

// Re-export key types for convenience
pub use claims::{CallerIdentity, TokenClaims};
pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, Result};
pub use jwks::{FETCH_TIMEOUT, HttpKeySetSource, JwksCache, KEY_SET_TTL, KeySetSource};
pub use verifier::TokenVerifier;

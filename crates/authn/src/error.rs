//! Authentication error types.
//!
//! This module defines errors that can occur during bearer-token verification
//! and signing-key-set retrieval.

use thiserror::Error;

/// Token verification errors.
///
/// Every failure condition in the verification path maps to exactly one of
/// these variants; nothing is silently swallowed. All variants are terminal
/// for the request except [`JwksUnavailable`](Self::JwksUnavailable), which
/// is recoverable on a later call once the remote key source responds.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// Malformed token - cannot be decoded.
    #[error("Invalid token format: {0}")]
    InvalidTokenFormat(String),

    /// No key in the current key set matches the token's `kid`.
    #[error("Signing key not found: {kid}")]
    KeyNotFound {
        /// Key ID that was not found.
        kid: String,
    },

    /// Token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// Issuer claim does not match the configured issuer.
    #[error("Invalid issuer: {0}")]
    InvalidIssuer(String),

    /// Signature verification or claims validation failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The remote key set could not be fetched.
    #[error("Key set unavailable: {0}")]
    JwksUnavailable(String),
}

impl AuthError {
    /// Creates a new `InvalidTokenFormat` error.
    #[must_use]
    pub fn invalid_token_format(message: impl Into<String>) -> Self {
        Self::InvalidTokenFormat(message.into())
    }

    /// Creates a new `KeyNotFound` error for the given key ID.
    #[must_use]
    pub fn key_not_found(kid: impl Into<String>) -> Self {
        Self::KeyNotFound { kid: kid.into() }
    }

    /// Creates a new `TokenExpired` error.
    #[must_use]
    pub fn token_expired() -> Self {
        Self::TokenExpired
    }

    /// Creates a new `InvalidIssuer` error.
    #[must_use]
    pub fn invalid_issuer(message: impl Into<String>) -> Self {
        Self::InvalidIssuer(message.into())
    }

    /// Creates a new `AuthenticationFailed` error.
    #[must_use]
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed(message.into())
    }

    /// Creates a new `JwksUnavailable` error.
    #[must_use]
    pub fn jwks_unavailable(message: impl Into<String>) -> Self {
        Self::JwksUnavailable(message.into())
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidToken => {
                AuthError::InvalidTokenFormat("invalid token structure".into())
            },
            ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                AuthError::InvalidTokenFormat(format!("token decoding failed: {}", err))
            },
            ErrorKind::InvalidSignature => {
                AuthError::AuthenticationFailed("signature verification failed".into())
            },
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidIssuer => {
                AuthError::InvalidIssuer("issuer claim does not match expected issuer".into())
            },
            _ => AuthError::AuthenticationFailed(format!("token validation failed: {}", err)),
        }
    }
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

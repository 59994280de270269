//! Verifier configuration.
//!
//! This module provides [`AuthConfig`], the process-wide configuration surface
//! for the token verifier: the identity provider's key-set URL, the expected
//! issuer, and the `require_auth` flag controlling bypass mode.

use std::env;

use thiserror::Error;

/// Environment variable holding the identity provider's JWKS URL.
pub const ENV_JWKS_URL: &str = "JWKS_URL";

/// Environment variable holding the expected `iss` claim value.
pub const ENV_JWT_ISSUER: &str = "JWT_ISSUER";

/// Environment variable controlling whether verification is enforced.
///
/// Defaults to enabled; only the literal values `false` or `0`
/// (case-insensitive) disable it.
pub const ENV_REQUIRE_AUTH: &str = "REQUIRE_AUTH";

/// Configuration errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required setting was not provided.
    #[error("{name} must be set when authentication is required")]
    MissingSetting {
        /// Name of the missing setting.
        name: &'static str,
    },
}

/// Configuration for [`TokenVerifier`](crate::verifier::TokenVerifier).
///
/// Read once at startup. When `require_auth` is `false` the verifier enters
/// bypass mode and the key set is never consulted; the bypass is driven only
/// by this explicit boolean and never inferred from other settings.
///
/// # Example
///
/// ```
/// use schema_api_authn::config::AuthConfig;
///
/// let config = AuthConfig::builder()
///     .with_jwks_url("https://idp.example.com/.well-known/jwks.json")
///     .with_issuer("https://idp.example.com")
///     .build()?;
/// # Ok::<(), schema_api_authn::config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AuthConfig {
    jwks_url: String,
    issuer: String,
    require_auth: bool,
}

impl AuthConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::default()
    }

    /// Loads the configuration from environment variables.
    ///
    /// Reads [`ENV_JWKS_URL`], [`ENV_JWT_ISSUER`] and [`ENV_REQUIRE_AUTH`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSetting`] if authentication is required
    /// but the key-set URL or issuer is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let require_auth = match env::var(ENV_REQUIRE_AUTH) {
            Ok(value) => !matches!(value.to_ascii_lowercase().as_str(), "false" | "0"),
            Err(_) => true,
        };

        Self::builder()
            .with_jwks_url(env::var(ENV_JWKS_URL).unwrap_or_default())
            .with_issuer(env::var(ENV_JWT_ISSUER).unwrap_or_default())
            .with_require_auth(require_auth)
            .build()
    }

    /// Returns the identity provider's key-set URL.
    ///
    /// May be empty when verification is disabled.
    #[must_use]
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Returns the expected issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns whether token verification is enforced.
    #[must_use]
    pub fn require_auth(&self) -> bool {
        self.require_auth
    }
}

/// Builder for [`AuthConfig`].
#[derive(Debug)]
pub struct AuthConfigBuilder {
    jwks_url: String,
    issuer: String,
    require_auth: bool,
}

impl Default for AuthConfigBuilder {
    fn default() -> Self {
        Self { jwks_url: String::new(), issuer: String::new(), require_auth: true }
    }
}

impl AuthConfigBuilder {
    /// Sets the identity provider's key-set URL.
    #[must_use]
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    /// Sets the expected `iss` claim value.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets whether token verification is enforced.
    ///
    /// Default: `true`. Setting this to `false` enables bypass mode, intended
    /// only for local and test environments.
    #[must_use]
    pub fn with_require_auth(mut self, require_auth: bool) -> Self {
        self.require_auth = require_auth;
        self
    }

    /// Builds the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSetting`] if `require_auth` is `true`
    /// and the key-set URL or issuer is empty.
    pub fn build(self) -> Result<AuthConfig, ConfigError> {
        if self.require_auth {
            if self.jwks_url.is_empty() {
                return Err(ConfigError::MissingSetting { name: ENV_JWKS_URL });
            }
            if self.issuer.is_empty() {
                return Err(ConfigError::MissingSetting { name: ENV_JWT_ISSUER });
            }
        }

        Ok(AuthConfig {
            jwks_url: self.jwks_url,
            issuer: self.issuer,
            require_auth: self.require_auth,
        })
    }
}

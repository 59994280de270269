//! Remote signing-key-set retrieval and caching.
//!
//! This module provides [`JwksCache`], a time-based cache in front of an
//! injectable [`KeySetSource`]. The production source is
//! [`HttpKeySetSource`], which fetches the identity provider's published
//! JWKS document over HTTP with a bounded timeout.
//!
//! ```text
//! token arrives → extract kid
//!               → JwksCache::get_keys (cached set if younger than TTL)
//!               → miss/stale? fetch from KeySetSource, atomic swap
//!               → find key by kid
//!               → verify signature
//! ```
//!
//! # Cache Strategy
//!
//! The whole key set is cached as one unit together with its fetch
//! timestamp; refresh replaces it wholesale rather than incrementally. A
//! refresh failure is surfaced as [`AuthError::JwksUnavailable`] even when a
//! previously fetched set exists — the cache favors freshness over
//! availability. Concurrent callers may race redundant fetches; fetches are
//! idempotent and the last writer wins.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use parking_lot::RwLock;

use crate::error::AuthError;

/// How long a fetched key set is served without re-fetching (1 hour).
///
/// Identity providers rotate signing keys rarely; a long TTL keeps the
/// verification hot path free of network round-trips.
pub const KEY_SET_TTL: Duration = Duration::from_secs(3_600);

/// Timeout for one outbound key-set fetch (10 seconds).
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of a signing key set.
///
/// Abstracting the fetch behind a trait keeps the cache substitutable with a
/// stub in tests and keeps the TTL logic independent of the transport.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    /// Fetches the current key set.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::JwksUnavailable`] if the set cannot be retrieved.
    async fn fetch(&self) -> Result<JwkSet, AuthError>;
}

/// Fetches the key set from the identity provider's JWKS endpoint.
///
/// An empty URL means verification is disabled globally; `fetch` then
/// returns an empty set without attempting any network call.
pub struct HttpKeySetSource {
    url: String,
    client: reqwest::Client,
}

impl HttpKeySetSource {
    /// Creates a new HTTP key-set source with the default fetch timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::JwksUnavailable`] if the HTTP client cannot be
    /// constructed (e.g., no TLS backend available).
    pub fn new(url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AuthError::jwks_unavailable(format!("failed to build client: {}", e)))?;
        Ok(Self { url: url.into(), client })
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        if self.url.is_empty() {
            return Ok(JwkSet { keys: Vec::new() });
        }

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AuthError::jwks_unavailable(format!("fetch failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AuthError::jwks_unavailable(format!("fetch failed: {}", e)))?;

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::jwks_unavailable(format!("invalid key set document: {}", e)))
    }
}

/// A fetched key set and the instant it was fetched.
///
/// Replaced as one unit under the write lock so readers never observe a
/// torn (keys, timestamp) pair.
struct CachedKeySet {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
}

/// Time-based cache for the identity provider's signing key set.
///
/// Holds at most one key set. While the set is younger than the TTL,
/// [`get_keys`](Self::get_keys) returns it without touching the source;
/// afterwards the next call re-fetches and atomically replaces the cache.
pub struct JwksCache {
    source: Arc<dyn KeySetSource>,
    ttl: Duration,
    state: RwLock<Option<CachedKeySet>>,
}

impl JwksCache {
    /// Creates a new cache with the default TTL ([`KEY_SET_TTL`]).
    #[must_use]
    pub fn new(source: Arc<dyn KeySetSource>) -> Self {
        Self::with_ttl(source, KEY_SET_TTL)
    }

    /// Creates a new cache with a custom TTL.
    #[must_use]
    pub fn with_ttl(source: Arc<dyn KeySetSource>, ttl: Duration) -> Self {
        Self { source, ttl, state: RwLock::new(None) }
    }

    /// Returns the current key set, fetching it if the cache is empty or
    /// older than the TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::JwksUnavailable`] if the fetch fails. A stale
    /// cached set is *not* used as a fallback; the failure is surfaced on
    /// this call even though a later call may succeed.
    #[tracing::instrument(skip(self))]
    pub async fn get_keys(&self) -> Result<Arc<JwkSet>, AuthError> {
        if let Some(cached) = self.state.read().as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                tracing::debug!(keys = cached.keys.keys.len(), "key set cache hit");
                return Ok(Arc::clone(&cached.keys));
            }
        }

        // The lock is not held across the fetch; concurrent callers may
        // fetch redundantly, which is harmless.
        let fetched = self.source.fetch().await.map_err(|e| {
            tracing::warn!(error = %e, "key set fetch failed");
            e
        })?;
        let keys = Arc::new(fetched);

        *self.state.write() =
            Some(CachedKeySet { keys: Arc::clone(&keys), fetched_at: Instant::now() });
        tracing::debug!(keys = keys.keys.len(), "key set cache refreshed");

        Ok(keys)
    }
}

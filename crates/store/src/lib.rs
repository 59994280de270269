//! # Schema API Store
//!
//! Read-only, identity-scoped entity store for the schema metadata API.
//!
//! A JSON dataset is loaded once at startup into an [`EntityStore`]; every
//! read is then evaluated against a caller [`Scope`]. An entity is visible to
//! a caller who owns it or whose account it belongs to. The store never
//! mutates after load, so a single instance can be shared across request
//! handlers behind an `Arc` without locking.
//!
//! ## Example
//!
//! ```no_run
//! use schema_api_store::{EntityStore, Page, Scope};
//!
//! # fn example() -> Result<(), schema_api_store::StoreError> {
//! let store = EntityStore::from_path("fixtures/data.json")?;
//! let scope = Scope::new("user_test123", "acct_test123");
//!
//! for ty in store.list_types(&scope, None, Page::default()) {
//!     println!("{}: {}", ty.id, ty.name);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Schema entity definitions.
pub mod entity;
/// Store error types.
pub mod error;
/// Scoped collections and the dataset-backed store.
pub mod store;

// Re-export key types for convenience
pub use entity::{Field, Object, ScopedEntity, Type, Validator, ValidatorType};
pub use error::{StoreError, StoreResult};
pub use store::{
    DEFAULT_PAGE_LIMIT, Dataset, EntityStore, MAX_PAGE_LIMIT, Page, Scope, ScopedCollection,
};

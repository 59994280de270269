//! Identity-scoped entity collections and the dataset-backed store.
//!
//! Entities are grouped per kind in a [`ScopedCollection`], which maintains a
//! primary id index plus secondary indexes by owner and by account. Every read
//! is filtered by the caller's [`Scope`]: an entity is visible when the caller
//! owns it or when it belongs to the caller's account. An entity matching both
//! is returned once.

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
};

use serde::Deserialize;

use crate::{
    entity::{Field, Object, ScopedEntity, Type, Validator},
    error::{StoreError, StoreResult},
};

/// Default number of entities returned per page.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Upper bound on the page size a caller may request.
pub const MAX_PAGE_LIMIT: usize = 1_000;

/// The identity a query is evaluated against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scope {
    /// Caller's user id.
    pub user_id: String,
    /// Caller's account id.
    pub account_id: String,
}

impl Scope {
    /// Creates a scope from a caller's user and account ids.
    pub fn new(user_id: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), account_id: account_id.into() }
    }
}

/// Offset/limit pagination window.
///
/// Out-of-range values degrade rather than fail: an offset past the end of the
/// result yields an empty page, and a limit larger than the remainder yields a
/// short page. Limits are clamped to [`MAX_PAGE_LIMIT`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    /// Maximum number of entities to return.
    pub limit: usize,
    /// Number of matching entities to skip.
    pub offset: usize,
}

impl Page {
    /// Creates a page, clamping the limit to [`MAX_PAGE_LIMIT`].
    #[must_use]
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit: limit.min(MAX_PAGE_LIMIT), offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: DEFAULT_PAGE_LIMIT, offset: 0 }
    }
}

/// Entities of one kind, indexed by id, owner and account.
///
/// Insertion order is preserved per index, so listings are deterministic for a
/// given dataset: a caller sees its owned entities in dataset order, followed
/// by account-shared entities it does not own, also in dataset order.
#[derive(Debug)]
pub struct ScopedCollection<T: ScopedEntity> {
    kind: &'static str,
    by_id: HashMap<String, T>,
    ids_by_owner: HashMap<String, Vec<String>>,
    ids_by_account: HashMap<String, Vec<String>>,
}

impl<T: ScopedEntity> ScopedCollection<T> {
    /// Creates an empty collection for the named entity kind.
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            by_id: HashMap::new(),
            ids_by_owner: HashMap::new(),
            ids_by_account: HashMap::new(),
        }
    }

    /// Inserts an entity, indexing it by id, owner and account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if an entity with the same id is
    /// already present.
    pub fn insert(&mut self, entity: T) -> StoreResult<()> {
        let id = entity.id().to_owned();
        if self.by_id.contains_key(&id) {
            return Err(StoreError::duplicate_id(self.kind, id));
        }

        self.ids_by_owner.entry(entity.owner_id().to_owned()).or_default().push(id.clone());
        self.ids_by_account.entry(entity.account_id().to_owned()).or_default().push(id.clone());
        self.by_id.insert(id, entity);
        Ok(())
    }

    /// Number of entities in the collection, regardless of scope.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the collection holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Ids visible to the scope: owned first, then account-shared, deduped.
    fn visible_ids(&self, scope: &Scope) -> Vec<&str> {
        let owned = self.ids_by_owner.get(&scope.user_id).map(Vec::as_slice).unwrap_or_default();
        let shared =
            self.ids_by_account.get(&scope.account_id).map(Vec::as_slice).unwrap_or_default();

        let mut seen = HashSet::with_capacity(owned.len() + shared.len());
        owned
            .iter()
            .chain(shared.iter())
            .filter(|id| seen.insert(id.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Lists visible entities, optionally filtered by namespace, paginated.
    ///
    /// A namespace filter matches by exact string equality. For kinds without
    /// a namespace attribute the filter is accepted and ignored.
    pub fn list(&self, scope: &Scope, namespace: Option<&str>, page: Page) -> Vec<&T> {
        self.visible_ids(scope)
            .into_iter()
            .filter_map(|id| self.by_id.get(id))
            .filter(|entity| match (namespace, entity.namespace()) {
                (Some(wanted), Some(actual)) => wanted == actual,
                _ => true,
            })
            .skip(page.offset)
            .take(page.limit)
            .collect()
    }

    /// Fetches one entity by id if it exists and is visible to the scope.
    ///
    /// Absence and denial are indistinguishable to the caller; both yield
    /// `None`.
    pub fn get(&self, scope: &Scope, id: &str) -> Option<&T> {
        self.by_id
            .get(id)
            .filter(|e| e.owner_id() == scope.user_id || e.account_id() == scope.account_id)
    }
}

/// On-disk dataset shape: one array per entity kind, each optional.
#[derive(Debug, Default, Deserialize)]
pub struct Dataset {
    /// Type records.
    #[serde(default)]
    pub types: Vec<Type>,
    /// Validator records.
    #[serde(default)]
    pub validators: Vec<Validator>,
    /// Field records.
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Object records.
    #[serde(default)]
    pub objects: Vec<Object>,
}

/// Read-only, identity-scoped store over a loaded dataset.
///
/// The store is immutable after construction and is `Send + Sync`, so it can
/// be shared across request handlers behind an `Arc` without locking.
#[derive(Debug)]
pub struct EntityStore {
    types: ScopedCollection<Type>,
    validators: ScopedCollection<Validator>,
    fields: ScopedCollection<Field>,
    objects: ScopedCollection<Object>,
}

impl EntityStore {
    /// Builds a store from an already-parsed dataset.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if two records of the same kind
    /// share an id. Nothing is retained from a failed load.
    pub fn from_dataset(dataset: Dataset) -> StoreResult<Self> {
        let mut types = ScopedCollection::new("type");
        for record in dataset.types {
            types.insert(record)?;
        }
        let mut validators = ScopedCollection::new("validator");
        for record in dataset.validators {
            validators.insert(record)?;
        }
        let mut fields = ScopedCollection::new("field");
        for record in dataset.fields {
            fields.insert(record)?;
        }
        let mut objects = ScopedCollection::new("object");
        for record in dataset.objects {
            objects.insert(record)?;
        }

        tracing::info!(
            types = types.len(),
            validators = validators.len(),
            fields = fields.len(),
            objects = objects.len(),
            "Loaded dataset"
        );

        Ok(Self { types, validators, fields, objects })
    }

    /// Parses a JSON dataset document and builds a store from it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] if the document is not valid JSON or
    /// any record fails validation, or [`StoreError::DuplicateId`] on id
    /// collisions. Ingestion is all-or-nothing.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let dataset: Dataset = serde_json::from_str(json)?;
        Self::from_dataset(dataset)
    }

    /// Reads a JSON dataset file and builds a store from it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::FileNotFound`] if the path does not exist,
    /// [`StoreError::Read`] on I/O failure, and the [`Self::from_json`]
    /// errors on bad content.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StoreError::FileNotFound { path: path.to_path_buf() });
        }
        let json = fs::read_to_string(path)
            .map_err(|source| StoreError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&json)
    }

    /// Lists types visible to the scope.
    ///
    /// Types carry no namespace, so `namespace` is accepted and ignored.
    pub fn list_types(&self, scope: &Scope, namespace: Option<&str>, page: Page) -> Vec<&Type> {
        self.types.list(scope, namespace, page)
    }

    /// Fetches one type by id if visible to the scope.
    pub fn get_type(&self, scope: &Scope, id: &str) -> Option<&Type> {
        self.types.get(scope, id)
    }

    /// Lists validators visible to the scope.
    ///
    /// Validators carry no namespace, so `namespace` is accepted and ignored.
    pub fn list_validators(
        &self,
        scope: &Scope,
        namespace: Option<&str>,
        page: Page,
    ) -> Vec<&Validator> {
        self.validators.list(scope, namespace, page)
    }

    /// Fetches one validator by id if visible to the scope.
    pub fn get_validator(&self, scope: &Scope, id: &str) -> Option<&Validator> {
        self.validators.get(scope, id)
    }

    /// Lists fields visible to the scope, optionally filtered by namespace.
    pub fn list_fields(&self, scope: &Scope, namespace: Option<&str>, page: Page) -> Vec<&Field> {
        self.fields.list(scope, namespace, page)
    }

    /// Fetches one field by id if visible to the scope.
    pub fn get_field(&self, scope: &Scope, id: &str) -> Option<&Field> {
        self.fields.get(scope, id)
    }

    /// Lists objects visible to the scope, optionally filtered by namespace.
    pub fn list_objects(&self, scope: &Scope, namespace: Option<&str>, page: Page) -> Vec<&Object> {
        self.objects.list(scope, namespace, page)
    }

    /// Fetches one object by id if visible to the scope.
    pub fn get_object(&self, scope: &Scope, id: &str) -> Option<&Object> {
        self.objects.get(scope, id)
    }
}

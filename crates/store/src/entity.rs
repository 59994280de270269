//! Schema entity definitions.
//!
//! Four related entity kinds make up the metadata model: [`Type`],
//! [`Validator`], [`Field`] and [`Object`]. Every entity carries an id, an
//! owner, an account and creation/update timestamps; relationships between
//! kinds are reference-by-id only. The store does not enforce referential
//! integrity — a `Field` may reference a nonexistent `Type` id without error.
//! This is an accepted simplification of the model, not a defect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Common access to the attributes the store scopes and filters on.
///
/// `namespace` returns `None` for kinds that carry no namespace attribute
/// ([`Type`] and [`Validator`]); the store then accepts a namespace filter
/// without applying it.
pub trait ScopedEntity {
    /// Unique identifier within the entity's kind.
    fn id(&self) -> &str;
    /// User id of the owner.
    fn owner_id(&self) -> &str;
    /// Account id the entity belongs to.
    fn account_id(&self) -> &str;
    /// Namespace grouping attribute, if the kind has one.
    fn namespace(&self) -> Option<&str> {
        None
    }
}

fn default_true() -> bool {
    true
}

fn default_error_message() -> String {
    "Validation failed".to_owned()
}

/// A data type (e.g., string, int, bool).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Type {
    /// Unique identifier for the type.
    pub id: String,
    /// Display name of the type.
    pub name: String,
    /// Source-language type representation (e.g., "str", "int", "bool").
    pub python_type: String,
    /// Optional description of the type.
    #[serde(default)]
    pub description: String,
    /// Whether this is a built-in type.
    #[serde(default = "default_true")]
    pub is_builtin: bool,
    /// Whether this type can be null.
    #[serde(default)]
    pub is_nullable: bool,
    /// Default value for this type.
    #[serde(default)]
    pub default_value: Option<Value>,
    /// User id of the owner.
    pub owner_id: String,
    /// Account id the type belongs to.
    pub account_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ScopedEntity for Type {
    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn account_id(&self) -> &str {
        &self.account_id
    }
}

/// Kinds of validation a [`Validator`] can perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorType {
    /// Length constraint.
    Length,
    /// Numeric range constraint.
    Range,
    /// Regular-expression match.
    Pattern,
    /// Caller-defined validation.
    Custom,
}

/// A validation rule applicable to fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Validator {
    /// Unique identifier for the validator.
    pub id: String,
    /// Display name of the validator.
    pub name: String,
    /// Kind of validation to perform.
    pub validator_type: ValidatorType,
    /// Optional description of the validator.
    #[serde(default)]
    pub description: String,
    /// Free-form configuration (e.g., min/max for range, regex for pattern).
    #[serde(default)]
    pub config: serde_json::Map<String, Value>,
    /// Message to display on validation failure.
    #[serde(default = "default_error_message")]
    pub error_message: String,
    /// User id of the owner.
    pub owner_id: String,
    /// Account id the validator belongs to.
    pub account_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ScopedEntity for Validator {
    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn account_id(&self) -> &str {
        &self.account_id
    }
}

/// A field in an object (e.g., a column in a table).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Unique identifier for the field.
    pub id: String,
    /// Display name of the field.
    pub name: String,
    /// Reference to a [`Type`] id.
    pub type_id: String,
    /// Optional description of the field.
    #[serde(default)]
    pub description: String,
    /// Whether this field is required.
    #[serde(default)]
    pub is_required: bool,
    /// Whether this field's values must be unique.
    #[serde(default)]
    pub is_unique: bool,
    /// Whether this field should be indexed.
    #[serde(default)]
    pub is_indexed: bool,
    /// Default value for this field.
    #[serde(default)]
    pub default_value: Option<Value>,
    /// Ordered [`Validator`] ids applied to this field.
    #[serde(default)]
    pub validator_ids: Vec<String>,
    /// Namespace grouping attribute.
    #[serde(default)]
    pub namespace: String,
    /// User id of the owner.
    pub owner_id: String,
    /// Account id the field belongs to.
    pub account_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ScopedEntity for Field {
    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn account_id(&self) -> &str {
        &self.account_id
    }

    fn namespace(&self) -> Option<&str> {
        Some(&self.namespace)
    }
}

/// A data object (e.g., a database table).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Object {
    /// Unique identifier for the object.
    pub id: String,
    /// Display name of the object.
    pub name: String,
    /// Optional description of the object.
    #[serde(default)]
    pub description: String,
    /// Ordered [`Field`] ids belonging to this object.
    #[serde(default)]
    pub field_ids: Vec<String>,
    /// Namespace grouping attribute.
    #[serde(default)]
    pub namespace: String,
    /// Database table name for this object.
    #[serde(default)]
    pub table_name: String,
    /// Whether this object is active.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// User id of the owner.
    pub owner_id: String,
    /// Account id the object belongs to.
    pub account_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ScopedEntity for Object {
    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn account_id(&self) -> &str {
        &self.account_id
    }

    fn namespace(&self) -> Option<&str> {
        Some(&self.namespace)
    }
}

//! Profile data models and API request/response types.
//!
//! This module defines:
//! - `Profile`: Database entity representing a profile
//! - `NewProfile`: Fully stamped row ready for insertion
//! - `CreateProfileRequest`: Request body for creating profiles
//! - `ProfileResponse`: Response body returned to clients
//! - The searchable column allow-list

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the backing table.
pub const PROFILES_TABLE: &str = "profiles";

/// Represents a profile record from the database.
///
/// # Database Table
///
/// Maps to the `profiles` table. Serde and sqlx share the same names, so the
/// JSON document produced by `serde_json::to_value` has exactly one key per
/// column. That document is what merge patches are applied to.
///
/// String fields default to empty so that a merge patch deleting them with
/// `null` still decodes.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Profile {
    /// Primary key, assigned by storage
    pub id: i64,

    #[serde(rename = "user_first_name", default)]
    #[sqlx(rename = "user_first_name")]
    pub first_name: String,

    #[serde(rename = "user_middle_name", default)]
    #[sqlx(rename = "user_middle_name")]
    pub middle_name: String,

    #[serde(rename = "user_last_name", default)]
    #[sqlx(rename = "user_last_name")]
    pub last_name: String,

    /// Free-form position document (JSONB)
    #[serde(rename = "user_position", default)]
    #[sqlx(rename = "user_position")]
    pub position: Option<Value>,

    /// Free-form company document (JSONB)
    #[serde(rename = "user_company", default)]
    #[sqlx(rename = "user_company")]
    pub company: Option<Value>,

    /// Hex-encoded private signing key
    ///
    /// Never leaves the service: `ProfileResponse` has no such field.
    #[serde(rename = "user_private_key", default)]
    #[sqlx(rename = "user_private_key")]
    pub private_key: String,

    /// Hex-encoded public verifying key
    #[serde(rename = "user_public_key", default)]
    #[sqlx(rename = "user_public_key")]
    pub public_key: String,

    #[serde(default)]
    pub meta: Option<Value>,

    pub created_at: DateTime<Utc>,

    /// Refreshed on every successful mutation
    pub updated_at: DateTime<Utc>,

    /// Set by soft delete; such rows are treated as absent
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Profile {
    #[cfg(test)]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A profile that has been stamped with keys and timestamps but not yet stored.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub position: Option<Value>,
    pub company: Option<Value>,
    pub meta: Option<Value>,
    pub private_key: String,
    pub public_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a new profile.
///
/// # JSON Example
///
/// ```json
/// {
///   "user_first_name": "Ann",
///   "user_last_name": "Lee",
///   "user_company": {"name": "Acme"},
///   "meta": {"source": "import"}
/// }
/// ```
///
/// Unknown keys (including `id`, timestamps and keys) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CreateProfileRequest {
    #[serde(rename = "user_first_name", default)]
    pub first_name: String,

    #[serde(rename = "user_middle_name", default)]
    pub middle_name: String,

    #[serde(rename = "user_last_name", default)]
    pub last_name: String,

    #[serde(rename = "user_position", default)]
    pub position: Option<Value>,

    #[serde(rename = "user_company", default)]
    pub company: Option<Value>,

    #[serde(default)]
    pub meta: Option<Value>,
}

/// Response body for profile endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 1,
///   "user_first_name": "Ann",
///   "user_middle_name": "",
///   "user_last_name": "Lee",
///   "user_position": null,
///   "user_company": {"name": "Acme"},
///   "user_public_key": "3b6a27bc...",
///   "meta": null,
///   "created_at": "2025-12-20T10:00:00Z",
///   "updated_at": "2025-12-20T10:00:00Z",
///   "deleted_at": null
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub user_first_name: String,
    pub user_middle_name: String,
    pub user_last_name: String,
    pub user_position: Option<Value>,
    pub user_company: Option<Value>,
    pub user_public_key: String,
    pub meta: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Convert database Profile to API ProfileResponse.
///
/// Drops the private key.
impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            user_first_name: profile.first_name,
            user_middle_name: profile.middle_name,
            user_last_name: profile.last_name,
            user_position: profile.position,
            user_company: profile.company,
            user_public_key: profile.public_key,
            meta: profile.meta,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
            deleted_at: profile.deleted_at,
        }
    }
}

/// One search map: every entry must match (AND).
pub type SearchFilter = Map<String, Value>;

/// How a search value has to be shaped to be bound against a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    Json,
    Timestamp,
}

/// Keys accepted in a search map, with the column each one filters on.
///
/// `user_id` is a legacy alias for `id`.
pub const SEARCHABLE_COLUMNS: &[(&str, &str, ColumnKind)] = &[
    ("id", "id", ColumnKind::Integer),
    ("user_id", "id", ColumnKind::Integer),
    ("user_first_name", "user_first_name", ColumnKind::Text),
    ("user_middle_name", "user_middle_name", ColumnKind::Text),
    ("user_last_name", "user_last_name", ColumnKind::Text),
    ("user_position", "user_position", ColumnKind::Json),
    ("user_company", "user_company", ColumnKind::Json),
    ("user_private_key", "user_private_key", ColumnKind::Text),
    ("user_public_key", "user_public_key", ColumnKind::Text),
    ("meta", "meta", ColumnKind::Json),
    ("created_at", "created_at", ColumnKind::Timestamp),
    ("updated_at", "updated_at", ColumnKind::Timestamp),
    ("deleted_at", "deleted_at", ColumnKind::Timestamp),
];

/// Look up a search key in the allow-list, returning its column and kind.
pub fn searchable_column(key: &str) -> Option<(&'static str, ColumnKind)> {
    SEARCHABLE_COLUMNS
        .iter()
        .find(|(name, _, _)| *name == key)
        .map(|(_, column, kind)| (*column, *kind))
}

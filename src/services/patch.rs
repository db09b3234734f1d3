//! Partial updates via RFC 7396 JSON merge patch.
//!
//! The stored profile is turned into its JSON document, the patch is merged
//! into that document, system-owned fields are copied back from the original,
//! and the result is decoded into a `Profile` again.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::AppError;
use crate::models::profile::Profile;

/// Fields a patch can never change.
const PROTECTED_FIELDS: &[&str] = &[
    "id",
    "user_private_key",
    "user_public_key",
    "created_at",
    "updated_at",
    "deleted_at",
];

/// Apply `patch` to `existing`, stamping `updated_at` with `now`.
///
/// `updated_at` never moves backwards, even if `now` is behind the stored value.
///
/// # Errors
///
/// `Decode` when the patch is not a JSON object or the merged document no
/// longer fits the profile shape.
pub fn merge_profile(
    existing: &Profile,
    patch: &[u8],
    now: DateTime<Utc>,
) -> Result<Profile, AppError> {
    let original = serde_json::to_value(existing).map_err(AppError::decode)?;
    let patch: Value = serde_json::from_slice(patch).map_err(AppError::decode)?;

    if !patch.is_object() {
        return Err(AppError::Decode(
            "merge patch must be a JSON object".to_string(),
        ));
    }

    let mut merged = original.clone();
    json_patch::merge(&mut merged, &patch);
    restore_protected(&mut merged, &original);

    let mut updated: Profile = serde_json::from_value(merged).map_err(AppError::decode)?;
    updated.updated_at = now.max(existing.updated_at);

    Ok(updated)
}

fn restore_protected(merged: &mut Value, original: &Value) {
    let (Some(merged), Some(original)) = (merged.as_object_mut(), original.as_object()) else {
        return;
    };

    for field in PROTECTED_FIELDS {
        match original.get(*field) {
            Some(value) => merged.insert((*field).to_string(), value.clone()),
            None => merged.remove(*field),
        };
    }
}

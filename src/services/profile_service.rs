//! Profile service - create, read, patch, delete and search profiles.
//!
//! Every function takes its collaborators (store, clock, key generator)
//! explicitly so it can be exercised without a database.

use crate::{
    clock::Clock,
    error::AppError,
    keys::KeyPairGenerator,
    models::profile::{CreateProfileRequest, NewProfile, Profile, SearchFilter},
    services::{
        patch::merge_profile,
        search::{SearchOptions, build_search_query},
    },
    store::ProfileStore,
};

/// Fetch a live profile by id.
///
/// # Errors
///
/// - `ProfileNotFound`: no row, or the row is soft-deleted
pub async fn get_profile(store: &dyn ProfileStore, id: i64) -> Result<Profile, AppError> {
    let profile = store
        .fetch_by_id(id)
        .await?
        .ok_or(AppError::ProfileNotFound)?;

    tracing::debug!(profile_id = id, "profile loaded");
    Ok(profile)
}

/// Create a profile.
///
/// # Process
///
/// 1. Stamp `created_at` and `updated_at` with the same instant
/// 2. Generate a signing key pair
/// 3. Insert and return the stored row (id assigned by storage)
pub async fn create_profile(
    store: &dyn ProfileStore,
    clock: &dyn Clock,
    keys: &dyn KeyPairGenerator,
    request: CreateProfileRequest,
) -> Result<Profile, AppError> {
    let now = clock.now();
    let key_pair = keys.generate();

    let new_profile = NewProfile {
        first_name: request.first_name,
        middle_name: request.middle_name,
        last_name: request.last_name,
        position: request.position,
        company: request.company,
        meta: request.meta,
        private_key: key_pair.private_key,
        public_key: key_pair.public_key,
        created_at: now,
        updated_at: now,
    };

    let profile = store.insert(&new_profile).await?;
    tracing::info!(profile_id = profile.id, "profile created");

    Ok(profile)
}

/// Apply a JSON merge patch to a live profile and persist the result.
///
/// Fetch and write are two statements; a profile soft-deleted in between
/// yields `ProfileNotFound`.
///
/// # Errors
///
/// - `ProfileNotFound`: no live profile with this id
/// - `Decode`: malformed patch or merged document
pub async fn update_profile(
    store: &dyn ProfileStore,
    clock: &dyn Clock,
    id: i64,
    patch: &[u8],
) -> Result<Profile, AppError> {
    let existing = get_profile(store, id).await?;
    let merged = merge_profile(&existing, patch, clock.now())?;

    let stored = store
        .update(&merged)
        .await?
        .ok_or(AppError::ProfileNotFound)?;
    tracing::info!(profile_id = id, "profile updated");

    Ok(stored)
}

/// Soft delete: set `deleted_at`, keep the row.
pub async fn soft_delete_profile(
    store: &dyn ProfileStore,
    clock: &dyn Clock,
    id: i64,
) -> Result<(), AppError> {
    if !store.soft_delete(id, clock.now()).await? {
        return Err(AppError::ProfileNotFound);
    }

    tracing::info!(profile_id = id, "profile soft-deleted");
    Ok(())
}

/// Hard delete: remove the row, whether or not it was soft-deleted first.
pub async fn hard_delete_profile(store: &dyn ProfileStore, id: i64) -> Result<(), AppError> {
    if !store.hard_delete(id).await? {
        return Err(AppError::ProfileNotFound);
    }

    tracing::info!(profile_id = id, "profile hard-deleted");
    Ok(())
}

/// Find profiles matching any of `filters`.
///
/// The whole request is validated before storage is touched.
///
/// # Errors
///
/// - `InvalidField`: a key outside the allow-list
/// - `Decode`: a value of the wrong type for its column
pub async fn search_profiles(
    store: &dyn ProfileStore,
    filters: &[SearchFilter],
    options: SearchOptions,
) -> Result<Vec<Profile>, AppError> {
    let query = build_search_query(filters, options)?;
    tracing::debug!(
        sql = %query.sql,
        params = ?query.params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        "running profile search"
    );

    store.search(&query).await
}

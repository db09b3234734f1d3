//! Profile HTTP handlers.
//!
//! This module implements the profile API endpoints:
//! - GET /api/v1/profile/:id - Get profile by ID
//! - POST /api/v1/profile - Create profile
//! - DELETE /api/v1/profile/:id - Soft delete (`?hard=true` for hard delete)
//! - PUT /api/v1/profiles/:id - Partial update with a JSON merge patch
//! - POST /api/v1/users/search - Search by any combination of fields

use crate::{
    error::AppError,
    models::profile::{CreateProfileRequest, ProfileResponse, SearchFilter},
    services::profile_service,
    state::AppState,
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// Get a live profile.
///
/// # Response
///
/// - **Success (200 OK)**: profile without its private key
/// - **Error (404)**: unknown or soft-deleted profile
pub async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<i64>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = profile_service::get_profile(state.store.as_ref(), profile_id).await?;

    Ok(Json(profile.into()))
}

/// Create a new profile.
///
/// # Request Body
///
/// ```json
/// {
///   "user_first_name": "Ann",
///   "user_last_name": "Lee",
///   "user_company": {"name": "Acme"}
/// }
/// ```
///
/// # Response
///
/// Returns 201 Created with the stored profile, including the generated
/// `user_public_key`.
pub async fn create_profile(
    State(state): State<AppState>,
    payload: Result<Json<CreateProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    let Json(request) = payload?;
    let profile = profile_service::create_profile(
        state.store.as_ref(),
        state.clock.as_ref(),
        state.keys.as_ref(),
        request,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(profile.into())))
}

/// Query string of the delete endpoint.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    /// Only the literal `true` selects a hard delete
    pub hard: Option<String>,
}

/// Body returned by operations with nothing else to report.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub result: &'static str,
}

/// Delete a profile.
///
/// Soft delete by default: the row stays with `deleted_at` set and is hidden
/// from reads. `?hard=true` removes the row.
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<i64>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<OkResponse>, AppError> {
    if params.hard.as_deref() == Some("true") {
        profile_service::hard_delete_profile(state.store.as_ref(), profile_id).await?;
    } else {
        profile_service::soft_delete_profile(state.store.as_ref(), state.clock.as_ref(), profile_id)
            .await?;
    }

    Ok(Json(OkResponse { result: "ok" }))
}

/// Update a profile with an RFC 7396 merge patch.
///
/// # Request Body
///
/// ```json
/// {"user_last_name": "Kim", "user_position": null}
/// ```
///
/// The body is read raw; `id`, keys and system timestamps in the patch are ignored.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<i64>,
    body: Bytes,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile =
        profile_service::update_profile(state.store.as_ref(), state.clock.as_ref(), profile_id, &body)
            .await
            .inspect_err(|err| {
                tracing::warn!(
                    profile_id,
                    body = %String::from_utf8_lossy(&body),
                    "profile not updated: {err}"
                )
            })?;

    Ok(Json(profile.into()))
}

/// Search profiles.
///
/// # Request Body
///
/// A JSON array of objects. Fields inside one object must all match; a
/// profile is returned if it matches any object. An empty array returns
/// every profile.
///
/// ```json
/// [
///   {"user_first_name": "Ann"},
///   {"user_last_name": "Lee", "user_position": null}
/// ]
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: array of profiles (may be empty)
/// - **Error (400)**: unknown field or value of the wrong type
pub async fn search_profiles(
    State(state): State<AppState>,
    payload: Result<Json<Vec<SearchFilter>>, JsonRejection>,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    let Json(filters) = payload?;
    let profiles =
        profile_service::search_profiles(state.store.as_ref(), &filters, state.search)
            .await
            .inspect_err(|err| tracing::warn!(filters = filters.len(), "profile search failed: {err}"))?;

    Ok(Json(profiles.into_iter().map(Into::into).collect()))
}

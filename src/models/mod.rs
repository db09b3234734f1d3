//! Data models representing database entities.

/// Profile entity, request and response shapes
pub mod profile;

//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Calls into the profile service with the injected collaborators
//! 3. Returns HTTP response (JSON, status code)

/// Liveness and database connectivity
pub mod health;
/// Profile CRUD and search endpoints
pub mod profiles;

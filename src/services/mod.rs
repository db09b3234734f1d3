//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.

pub mod patch;
pub mod profile_service;
pub mod search;

//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `PUBLIC_ADDR` (optional): public listener (health only), defaults to `0.0.0.0:9000`
/// - `PRIVATE_ADDR` (optional): private listener (profile API), defaults to `0.0.0.0:9100`
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `SEARCH_INCLUDE_DELETED` (optional): include soft-deleted rows in search results, defaults to false
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_public_addr")]
    pub public_addr: String,

    #[serde(default = "default_private_addr")]
    pub private_addr: String,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default)]
    pub search_include_deleted: bool,
}

fn default_public_addr() -> String {
    "0.0.0.0:9000".to_string()
}

fn default_private_addr() -> String {
    "0.0.0.0:9100".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is read first when present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` is missing
    /// - A value cannot be parsed into the expected type
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    /// Same as [`Config::from_env`] but reads from an explicit iterator of pairs.
    #[cfg(test)]
    fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(pairs)
    }
}

//! Storage seam for profiles.
//!
//! Services talk to `ProfileStore` only. `PgProfileStore` is the PostgreSQL
//! implementation used by the server; tests use the in-memory store below.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{Postgres, types::Json};

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::profile::{NewProfile, Profile};
use crate::services::search::{SearchQuery, SearchValue};

/// Operations the profile service needs from storage.
///
/// "Live" rows are those with `deleted_at IS NULL`.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), AppError>;

    /// Fetch a live profile.
    async fn fetch_by_id(&self, id: i64) -> Result<Option<Profile>, AppError>;

    /// Insert and return the stored row, with its assigned id.
    async fn insert(&self, profile: &NewProfile) -> Result<Profile, AppError>;

    /// Overwrite the mutable columns of a live profile.
    ///
    /// Returns `None` if the row vanished or was soft-deleted meanwhile.
    async fn update(&self, profile: &Profile) -> Result<Option<Profile>, AppError>;

    /// Mark a live profile deleted. Returns whether a row was affected.
    async fn soft_delete(&self, id: i64, at: DateTime<Utc>) -> Result<bool, AppError>;

    /// Physically remove a profile, deleted or not. Returns whether a row was affected.
    async fn hard_delete(&self, id: i64) -> Result<bool, AppError>;

    /// Run a query produced by `build_search_query`.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Profile>, AppError>;
}

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgProfileStore {
    pool: Option<DbPool>,
}

impl PgProfileStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool: Some(pool) }
    }

    /// A store with no connection; every call fails with `ConnectionUnavailable`.
    #[cfg(test)]
    pub fn disconnected() -> Self {
        Self { pool: None }
    }

    fn pool(&self) -> Result<&DbPool, AppError> {
        match &self.pool {
            Some(pool) if !pool.is_closed() => Ok(pool),
            _ => Err(AppError::ConnectionUnavailable),
        }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool()?).await?;
        Ok(())
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(self.pool()?)
        .await?;

        Ok(profile)
    }

    async fn insert(&self, profile: &NewProfile) -> Result<Profile, AppError> {
        let stored = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (
                user_first_name,
                user_middle_name,
                user_last_name,
                user_position,
                user_company,
                user_private_key,
                user_public_key,
                meta,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&profile.first_name)
        .bind(&profile.middle_name)
        .bind(&profile.last_name)
        .bind(profile.position.clone().map(Json))
        .bind(profile.company.clone().map(Json))
        .bind(&profile.private_key)
        .bind(&profile.public_key)
        .bind(profile.meta.clone().map(Json))
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_one(self.pool()?)
        .await?;

        Ok(stored)
    }

    async fn update(&self, profile: &Profile) -> Result<Option<Profile>, AppError> {
        // Keys, created_at and deleted_at are never written by an update
        let stored = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET user_first_name = $2,
                user_middle_name = $3,
                user_last_name = $4,
                user_position = $5,
                user_company = $6,
                meta = $7,
                updated_at = $8
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(&profile.first_name)
        .bind(&profile.middle_name)
        .bind(&profile.last_name)
        .bind(profile.position.clone().map(Json))
        .bind(profile.company.clone().map(Json))
        .bind(profile.meta.clone().map(Json))
        .bind(profile.updated_at)
        .fetch_optional(self.pool()?)
        .await?;

        Ok(stored)
    }

    async fn soft_delete(&self, id: i64, at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE profiles SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(self.pool()?)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn hard_delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(self.pool()?)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Profile>, AppError> {
        let pool = self.pool()?;

        let mut q = sqlx::query_as::<_, Profile>(&query.sql);
        for param in &query.params {
            q = bind_search_value(q, &param.value);
        }

        Ok(q.fetch_all(pool).await?)
    }
}

fn bind_search_value<'q>(
    q: QueryAs<'q, Postgres, Profile, PgArguments>,
    value: &'q SearchValue,
) -> QueryAs<'q, Postgres, Profile, PgArguments> {
    match value {
        SearchValue::Integer(i) => q.bind(*i),
        SearchValue::Text(s) => q.bind(s.as_str()),
        SearchValue::Json(v) => q.bind(Json(v.clone())),
        SearchValue::Timestamp(at) => q.bind(*at),
    }
}

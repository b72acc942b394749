// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Postgres-backed credential store.
//!
//! One row per Strava athlete in the `tokens` table, keyed by `user_id`.

use crate::db::CredentialStore;
use crate::error::AppError;
use crate::models::Credentials;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

const MAX_CONNECTIONS: u32 = 5;

const CREATE_TOKENS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS tokens (
        user_id       TEXT PRIMARY KEY,
        access_token  TEXT NOT NULL,
        refresh_token TEXT NOT NULL,
        expires_at    BIGINT NOT NULL
    )";

/// Postgres credential store client.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Connect to Postgres and make sure the `tokens` table exists.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Postgres: {}", e)))?;

        let store = Self::from_pool(pool);
        store.migrate().await?;

        tracing::info!("Connected to Postgres credential store");
        Ok(store)
    }

    /// Wrap an existing pool without running the schema setup.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `tokens` table if it is missing.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::query(CREATE_TOKENS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Remove a user's credentials.
    pub async fn delete(&self, user_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn get(&self, user_id: &str) -> Result<Option<Credentials>, AppError> {
        let row = sqlx::query_as::<_, Credentials>(
            "SELECT user_id, access_token, refresh_token, expires_at FROM tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn set(&self, credentials: &Credentials) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO tokens (user_id, access_token, refresh_token, expires_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id) DO UPDATE SET
                 access_token = EXCLUDED.access_token,
                 refresh_token = EXCLUDED.refresh_token,
                 expires_at = EXCLUDED.expires_at",
        )
        .bind(&credentials.user_id)
        .bind(&credentials.access_token)
        .bind(&credentials.refresh_token)
        .bind(credentials.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

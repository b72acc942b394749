// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential store layer (Postgres, with an in-memory variant for tests).

pub mod memory;
pub mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

use crate::error::AppError;
use crate::models::Credentials;
use async_trait::async_trait;

/// Key-value persistence of per-user OAuth credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Get credentials for a user, `None` if the user never authorized.
    async fn get(&self, user_id: &str) -> Result<Option<Credentials>, AppError>;

    /// Insert or replace the credentials for `credentials.user_id`.
    async fn set(&self, credentials: &Credentials) -> Result<(), AppError>;
}

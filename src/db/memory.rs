// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory credential store for tests and local runs without Postgres.

use crate::db::CredentialStore;
use crate::error::AppError;
use crate::models::Credentials;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Credential store backed by a shared concurrent map.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    entries: Arc<DashMap<String, Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with stored credentials.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, user_id: &str) -> Result<Option<Credentials>, AppError> {
        Ok(self.entries.get(user_id).map(|c| c.clone()))
    }

    async fn set(&self, credentials: &Credentials) -> Result<(), AppError> {
        self.entries
            .insert(credentials.user_id.clone(), credentials.clone());
        Ok(())
    }
}

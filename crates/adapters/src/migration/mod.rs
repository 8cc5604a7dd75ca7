// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target-platform migration API

mod github;

pub use github::GithubMigrationApi;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMigrationApi, MigrationCall};

use crate::http::HttpError;
use async_trait::async_trait;
use mig_core::{
    OrganizationMigration, OrganizationMigrationRequest, RepositoryMigration,
    RepositoryMigrationRequest,
};
use thiserror::Error;

/// Errors from migration API calls
#[derive(Debug, Clone, Error)]
pub enum MigrationApiError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("GraphQL error: {0}")]
    GraphQl(String),
    #[error("migration not found: {0}")]
    NotFound(String),
    #[error("enterprise not found: {0}")]
    EnterpriseNotFound(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl MigrationApiError {
    pub fn is_transient(&self) -> bool {
        matches!(self, MigrationApiError::Http(e) if e.is_transient())
    }
}

/// Adapter for the platform that runs migrations (GitHub)
#[async_trait]
pub trait MigrationApi: Clone + Send + Sync + 'static {
    /// Fetch the current snapshot of a repository migration
    async fn get_repository_migration(
        &self,
        id: &str,
    ) -> Result<RepositoryMigration, MigrationApiError>;

    /// Fetch the current snapshot of an organization migration
    async fn get_organization_migration(
        &self,
        id: &str,
    ) -> Result<OrganizationMigration, MigrationApiError>;

    /// Start a repository migration, returning its id
    async fn start_repository_migration(
        &self,
        request: &RepositoryMigrationRequest,
    ) -> Result<String, MigrationApiError>;

    /// Start an organization migration, returning its id
    async fn start_organization_migration(
        &self,
        request: &OrganizationMigrationRequest,
    ) -> Result<String, MigrationApiError>;

    /// Log URL of the latest migration of `org/repo`
    ///
    /// `None` when no migration exists; an empty string while the log is
    /// still being generated.
    async fn get_migration_log_url(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<Option<String>, MigrationApiError>;

    /// Download a migration log
    async fn download_log(&self, url: &str) -> Result<String, MigrationApiError>;
}

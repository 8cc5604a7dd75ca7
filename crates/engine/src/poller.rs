// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Migration status polling
//!
//! Polls a migration until it leaves its pending states, logging progress on
//! every cycle. Waits suspend on the tokio timer, so dropping the future
//! cancels the poll.

use crate::config::EngineConfig;
use crate::error::MigrationError;
use mig_adapters::MigrationApi;
use mig_core::{
    MigrationKind, MigrationRecord, OrganizationMigration, OrganizationMigrationRequest,
    RepositoryMigration, RepositoryMigrationRequest, RetryOutcome, RetryPolicy,
};
use std::time::Duration;

/// Log line describing how many warnings a migration produced
pub fn warnings_message(count: u32) -> String {
    match count {
        0 => "No warnings encountered during this migration".to_string(),
        1 => "1 warning encountered during this migration".to_string(),
        n => format!("{} warnings encountered during this migration", n),
    }
}

fn log_terminal_details(migration: &RepositoryMigration) {
    if migration.warnings_count > 0 {
        tracing::warn!("{}", warnings_message(migration.warnings_count));
    } else {
        tracing::info!("{}", warnings_message(0));
    }
    if let Some(url) = migration
        .migration_log_url
        .as_deref()
        .filter(|u| !u.is_empty())
    {
        tracing::info!("Migration log available at {}", url);
    }
}

/// Drives migrations on the target platform to a terminal state
#[derive(Clone)]
pub struct MigrationPoller<M> {
    api: M,
    poll_interval: Duration,
    retry: RetryPolicy,
}

impl<M: MigrationApi> MigrationPoller<M> {
    pub fn new(api: M, poll_interval: Duration, retry: RetryPolicy) -> Self {
        Self {
            api,
            poll_interval,
            retry,
        }
    }

    pub fn from_config(api: M, config: &EngineConfig) -> Self {
        Self::new(api, config.migration_poll_interval, config.retry.clone())
    }

    pub fn api(&self) -> &M {
        &self.api
    }

    /// Wait for a migration of either kind, classified by its id prefix
    pub async fn wait_for_migration(&self, id: &str) -> Result<MigrationRecord, MigrationError> {
        match MigrationKind::from_id(id) {
            Some(MigrationKind::Repository) => self
                .wait_for_repository_migration(id)
                .await
                .map(MigrationRecord::Repository),
            Some(MigrationKind::Organization) => self
                .wait_for_organization_migration(id)
                .await
                .map(MigrationRecord::Organization),
            None => Err(MigrationError::InvalidMigrationId(id.to_string())),
        }
    }

    pub async fn wait_for_repository_migration(
        &self,
        id: &str,
    ) -> Result<RepositoryMigration, MigrationError> {
        let mut migration = self.api.get_repository_migration(id).await?;
        tracing::info!(
            "Waiting for {} migration (ID: {}) to finish...",
            migration.repository_name,
            id
        );

        while migration.state.is_pending() {
            tracing::info!(
                "Migration {} for {} is {}",
                id,
                migration.repository_name,
                migration.state
            );
            self.pause().await;
            migration = self.api.get_repository_migration(id).await?;
        }

        if migration.state.is_failed() {
            tracing::error!("Migration {} failed for {}", id, migration.repository_name);
            log_terminal_details(&migration);
            return Err(MigrationError::RepositoryMigrationFailed {
                id: id.to_string(),
                repository_name: migration.repository_name.clone(),
                reason: migration.failure_reason.clone().unwrap_or_default(),
            });
        }

        tracing::info!("Migration {} succeeded for {}", id, migration.repository_name);
        log_terminal_details(&migration);
        Ok(migration)
    }

    pub async fn wait_for_organization_migration(
        &self,
        id: &str,
    ) -> Result<OrganizationMigration, MigrationError> {
        let mut migration = self.api.get_organization_migration(id).await?;
        tracing::info!(
            "Waiting for {} -> {} migration (ID: {}) to finish...",
            migration.source_org_url,
            migration.target_org_name,
            id
        );

        while migration.state.is_pending() {
            if migration.state.is_repo_migration() {
                let (completed, total) = migration.repository_progress();
                tracing::info!(
                    "Migration {} is {} - {}/{} repositories completed",
                    id,
                    migration.state,
                    completed,
                    total
                );
            } else {
                tracing::info!("Migration {} is {}", id, migration.state);
            }
            self.pause().await;
            migration = self.api.get_organization_migration(id).await?;
        }

        if migration.state.is_failed() {
            tracing::error!(
                "Migration {} failed for {} -> {}",
                id,
                migration.source_org_url,
                migration.target_org_name
            );
            return Err(MigrationError::OrganizationMigrationFailed {
                id: id.to_string(),
                source_org_url: migration.source_org_url.clone(),
                target_org_name: migration.target_org_name.clone(),
                reason: migration.failure_reason.clone().unwrap_or_default(),
            });
        }

        tracing::info!("Migration {} succeeded", id);
        Ok(migration)
    }

    pub async fn start_repository_migration(
        &self,
        request: &RepositoryMigrationRequest,
    ) -> Result<String, MigrationError> {
        tracing::info!(
            "Migrating repository {} from {}",
            request.repository_name,
            request.source_repository_url
        );
        let id = self.api.start_repository_migration(request).await?;
        tracing::info!("Migration started (ID: {})", id);
        Ok(id)
    }

    pub async fn start_organization_migration(
        &self,
        request: &OrganizationMigrationRequest,
    ) -> Result<String, MigrationError> {
        tracing::info!(
            "Migrating organization {} to {}",
            request.source_org_url,
            request.target_org_name
        );
        let id = self.api.start_organization_migration(request).await?;
        tracing::info!("Migration started (ID: {})", id);
        Ok(id)
    }

    /// Start a repository migration and, unless `queue_only`, wait for it
    pub async fn migrate_repository(
        &self,
        request: &RepositoryMigrationRequest,
        queue_only: bool,
    ) -> Result<String, MigrationError> {
        let id = self.start_repository_migration(request).await?;
        if queue_only {
            tracing::info!(
                "A repository migration (ID: {}) was successfully queued.",
                id
            );
            return Ok(id);
        }
        self.wait_for_repository_migration(&id).await?;
        Ok(id)
    }

    /// Start an organization migration and, unless `queue_only`, wait for it
    pub async fn migrate_organization(
        &self,
        request: &OrganizationMigrationRequest,
        queue_only: bool,
    ) -> Result<String, MigrationError> {
        let id = self.start_organization_migration(request).await?;
        if queue_only {
            tracing::info!(
                "An organization migration (ID: {}) was successfully queued.",
                id
            );
            return Ok(id);
        }
        self.wait_for_organization_migration(&id).await?;
        Ok(id)
    }

    /// Wait for the log of the latest migration of `org/repo` to be generated
    ///
    /// Returns the log URL. An empty URL means the log is still being
    /// produced; the lookup is retried within the retry policy's budget.
    pub async fn wait_for_migration_log(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<String, MigrationError> {
        let pending = Some(String::new());
        let outcome = self
            .retry
            .retry_on_result(
                || self.api.get_migration_log_url(org, repo),
                &pending,
                "Waiting for migration log to populate...",
            )
            .await?;

        match outcome {
            RetryOutcome::Successful(Some(url)) => Ok(url),
            RetryOutcome::Successful(None) => Err(MigrationError::MigrationNotFound {
                org: org.to_string(),
                repo: repo.to_string(),
            }),
            RetryOutcome::Failure => Err(MigrationError::LogUnavailable {
                org: org.to_string(),
                repo: repo.to_string(),
            }),
        }
    }

    /// Wait for a migration log and download its contents
    pub async fn download_migration_log(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<String, MigrationError> {
        let url = self.wait_for_migration_log(org, repo).await?;
        tracing::info!("Downloading migration log for {}/{}", org, repo);
        Ok(self.api.download_log(&url).await?)
    }

    async fn pause(&self) {
        tracing::info!("Waiting {} seconds...", self.poll_interval.as_secs());
        tokio::time::sleep(self.poll_interval).await;
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;

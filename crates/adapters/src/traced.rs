// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability
//!
//! Mutating calls get an `info` span with elapsed time and the error on
//! failure. Read-only calls pass through with a `debug` line.

use crate::migration::{MigrationApi, MigrationApiError};
use crate::pipeline::{PipelineApi, PipelineApiError};
use async_trait::async_trait;
use mig_core::{
    BuildStatus, GithubTarget, OrganizationMigration, OrganizationMigrationRequest,
    PipelineBinding, PipelineRepository, PipelineScope, PipelineSettings, RepositoryMigration,
    RepositoryMigrationRequest, SourceRepository,
};
use std::time::Instant;
use tracing::Instrument;

fn log_outcome<T, E: std::fmt::Display>(result: &Result<T, E>, start: Instant, op: &str) {
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(_) => tracing::info!(elapsed_ms, "{} succeeded", op),
        Err(e) => tracing::error!(elapsed_ms, error = %e, "{} failed", op),
    }
}

/// Wrapper that adds tracing to any PipelineApi
#[derive(Clone)]
pub struct TracedPipelineApi<P> {
    inner: P,
}

impl<P> TracedPipelineApi<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: PipelineApi> PipelineApi for TracedPipelineApi<P> {
    fn definition_url(&self, scope: &PipelineScope, pipeline_id: u64) -> String {
        self.inner.definition_url(scope, pipeline_id)
    }

    async fn get_pipeline_id(
        &self,
        scope: &PipelineScope,
        pipeline: &str,
    ) -> Result<u64, PipelineApiError> {
        let result = self.inner.get_pipeline_id(scope, pipeline).await;
        tracing::debug!(%scope, pipeline, ok = result.is_ok(), "pipeline.lookup");
        result
    }

    async fn is_pipeline_enabled(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<bool, PipelineApiError> {
        self.inner.is_pipeline_enabled(scope, pipeline_id).await
    }

    async fn get_pipeline(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<PipelineSettings, PipelineApiError> {
        let result = self.inner.get_pipeline(scope, pipeline_id).await;
        tracing::debug!(%scope, pipeline_id, ok = result.is_ok(), "pipeline.settings");
        result
    }

    async fn get_pipeline_repository(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<PipelineRepository, PipelineApiError> {
        let result = self.inner.get_pipeline_repository(scope, pipeline_id).await;
        tracing::debug!(%scope, pipeline_id, ok = result.is_ok(), "pipeline.repository");
        result
    }

    async fn rewire_pipeline(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        target: &GithubTarget,
        settings: &PipelineSettings,
    ) -> Result<(), PipelineApiError> {
        let span = tracing::info_span!(
            "pipeline.rewire",
            %scope,
            pipeline_id,
            github = %format!("{}/{}", target.org, target.repo)
        );
        async {
            let start = Instant::now();
            let result = self
                .inner
                .rewire_pipeline(scope, pipeline_id, target, settings)
                .await;
            log_outcome(&result, start, "rewire");
            result
        }
        .instrument(span)
        .await
    }

    async fn restore_pipeline(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        binding: &PipelineBinding,
    ) -> Result<(), PipelineApiError> {
        let span = tracing::info_span!(
            "pipeline.restore",
            %scope,
            pipeline_id,
            repo = %binding.repo_name
        );
        async {
            let start = Instant::now();
            let result = self.inner.restore_pipeline(scope, pipeline_id, binding).await;
            log_outcome(&result, start, "restore");
            result
        }
        .instrument(span)
        .await
    }

    async fn queue_build(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        source_branch: &str,
    ) -> Result<u64, PipelineApiError> {
        let span = tracing::info_span!("pipeline.queue_build", %scope, pipeline_id, source_branch);
        async {
            let start = Instant::now();
            let result = self.inner.queue_build(scope, pipeline_id, source_branch).await;
            if let Ok(build_id) = &result {
                tracing::info!(build_id, "build queued");
            }
            log_outcome(&result, start, "queue build");
            result
        }
        .instrument(span)
        .await
    }

    async fn get_build_status(
        &self,
        scope: &PipelineScope,
        build_id: u64,
    ) -> Result<BuildStatus, PipelineApiError> {
        let result = self.inner.get_build_status(scope, build_id).await;
        if let Ok(status) = &result {
            tracing::debug!(
                build_id,
                status = status.status.as_deref().unwrap_or("-"),
                result = status.result.as_deref().unwrap_or("-"),
                "build.status"
            );
        }
        result
    }

    async fn get_enabled_repositories(
        &self,
        scope: &PipelineScope,
    ) -> Result<Vec<SourceRepository>, PipelineApiError> {
        let result = self.inner.get_enabled_repositories(scope).await;
        if let Ok(repos) = &result {
            tracing::debug!(%scope, count = repos.len(), "repositories.enabled");
        }
        result
    }

    async fn get_pipelines_for_repository(
        &self,
        scope: &PipelineScope,
        repo_id: &str,
    ) -> Result<Vec<String>, PipelineApiError> {
        let result = self.inner.get_pipelines_for_repository(scope, repo_id).await;
        if let Ok(names) = &result {
            tracing::debug!(%scope, repo_id, count = names.len(), "repository.pipelines");
        }
        result
    }
}

/// Wrapper that adds tracing to any MigrationApi
#[derive(Clone)]
pub struct TracedMigrationApi<M> {
    inner: M,
}

impl<M> TracedMigrationApi<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<M: MigrationApi> MigrationApi for TracedMigrationApi<M> {
    async fn get_repository_migration(
        &self,
        id: &str,
    ) -> Result<RepositoryMigration, MigrationApiError> {
        let result = self.inner.get_repository_migration(id).await;
        if let Ok(m) = &result {
            tracing::debug!(migration_id = id, state = %m.state, "migration.repository");
        }
        result
    }

    async fn get_organization_migration(
        &self,
        id: &str,
    ) -> Result<OrganizationMigration, MigrationApiError> {
        let result = self.inner.get_organization_migration(id).await;
        if let Ok(m) = &result {
            tracing::debug!(migration_id = id, state = %m.state, "migration.organization");
        }
        result
    }

    async fn start_repository_migration(
        &self,
        request: &RepositoryMigrationRequest,
    ) -> Result<String, MigrationApiError> {
        let span = tracing::info_span!("migration.start_repository", repo = %request.repository_name);
        async {
            let start = Instant::now();
            let result = self.inner.start_repository_migration(request).await;
            if let Ok(id) = &result {
                tracing::info!(migration_id = %id, "migration queued");
            }
            log_outcome(&result, start, "start repository migration");
            result
        }
        .instrument(span)
        .await
    }

    async fn start_organization_migration(
        &self,
        request: &OrganizationMigrationRequest,
    ) -> Result<String, MigrationApiError> {
        let span = tracing::info_span!(
            "migration.start_organization",
            source = %request.source_org_url,
            target = %request.target_org_name
        );
        async {
            let start = Instant::now();
            let result = self.inner.start_organization_migration(request).await;
            if let Ok(id) = &result {
                tracing::info!(migration_id = %id, "migration queued");
            }
            log_outcome(&result, start, "start organization migration");
            result
        }
        .instrument(span)
        .await
    }

    async fn get_migration_log_url(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<Option<String>, MigrationApiError> {
        self.inner.get_migration_log_url(org, repo).await
    }

    async fn download_log(&self, url: &str) -> Result<String, MigrationApiError> {
        let span = tracing::info_span!("migration.download_log");
        async {
            let start = Instant::now();
            let result = self.inner.download_log(url).await;
            log_outcome(&result, start, "download log");
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source-platform CI pipeline API

mod ado;

pub use ado::AdoPipelineApi;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePipeline, FakePipelineApi, PipelineCall};

use crate::http::HttpError;
use async_trait::async_trait;
use mig_core::{
    BuildStatus, GithubTarget, PipelineBinding, PipelineRepository, PipelineScope,
    PipelineSettings, SourceRepository,
};
use thiserror::Error;

/// Errors from pipeline API calls
#[derive(Debug, Clone, Error)]
pub enum PipelineApiError {
    #[error("unable to find pipeline {pipeline} in {scope}")]
    PipelineNotFound { scope: String, pipeline: String },
    #[error("unable to find repository {repo} in {scope}")]
    RepositoryNotFound { scope: String, repo: String },
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("{0}")]
    Rejected(String),
}

impl PipelineApiError {
    /// Whether the same call might succeed if repeated
    pub fn is_transient(&self) -> bool {
        matches!(self, PipelineApiError::Http(e) if e.is_transient())
    }
}

/// Adapter for the platform that owns the CI pipelines (Azure DevOps)
#[async_trait]
pub trait PipelineApi: Clone + Send + Sync + 'static {
    /// Browser URL of a pipeline definition
    fn definition_url(&self, scope: &PipelineScope, pipeline_id: u64) -> String;

    /// Resolve a pipeline name or folder path to its id
    async fn get_pipeline_id(
        &self,
        scope: &PipelineScope,
        pipeline: &str,
    ) -> Result<u64, PipelineApiError>;

    async fn is_pipeline_enabled(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<bool, PipelineApiError>;

    /// Branch, flags and trigger configuration of a pipeline
    async fn get_pipeline(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<PipelineSettings, PipelineApiError>;

    /// Repository the pipeline currently builds from
    async fn get_pipeline_repository(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<PipelineRepository, PipelineApiError>;

    /// Point the pipeline at a GitHub repository
    async fn rewire_pipeline(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        target: &GithubTarget,
        settings: &PipelineSettings,
    ) -> Result<(), PipelineApiError>;

    /// Re-apply a previously captured binding
    async fn restore_pipeline(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        binding: &PipelineBinding,
    ) -> Result<(), PipelineApiError>;

    /// Queue a manual build of `source_branch`, returning the build id
    async fn queue_build(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        source_branch: &str,
    ) -> Result<u64, PipelineApiError>;

    async fn get_build_status(
        &self,
        scope: &PipelineScope,
        build_id: u64,
    ) -> Result<BuildStatus, PipelineApiError>;

    async fn get_enabled_repositories(
        &self,
        scope: &PipelineScope,
    ) -> Result<Vec<SourceRepository>, PipelineApiError>;

    /// Qualified names (`\folder\name`) of pipelines building a repository
    async fn get_pipelines_for_repository(
        &self,
        scope: &PipelineScope,
        repo_id: &str,
    ) -> Result<Vec<String>, PipelineApiError>;
}

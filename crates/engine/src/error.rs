// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the orchestration engine

use mig_adapters::{MigrationApiError, PipelineApiError, ReportError};
use mig_core::PipelineTestResult;
use thiserror::Error;

/// Invalid engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max_concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("retry.max_attempts must be at least 1")]
    ZeroAttempts,
}

/// Errors from driving a migration
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Invalid migration id: {0}")]
    InvalidMigrationId(String),
    /// Displays as the platform's failure reason, verbatim
    #[error("{reason}")]
    RepositoryMigrationFailed {
        id: String,
        repository_name: String,
        reason: String,
    },
    #[error("Migration {id} failed for {source_org_url} -> {target_org_name}. Failure reason: {reason}")]
    OrganizationMigrationFailed {
        id: String,
        source_org_url: String,
        target_org_name: String,
        reason: String,
    },
    #[error("Migration for repository {repo} not found!")]
    MigrationNotFound { org: String, repo: String },
    #[error("Migration log for repository {repo} unavailable!")]
    LogUnavailable { org: String, repo: String },
    #[error(transparent)]
    Api(#[from] MigrationApiError),
}

/// Errors from testing or rewiring a single pipeline
#[derive(Debug, Error)]
pub enum PipelineTestError {
    #[error("Unable to find pipeline '{pipeline}' in {scope}")]
    PipelineNotFound { scope: String, pipeline: String },
    #[error(transparent)]
    Api(#[from] PipelineApiError),
    /// The run failed after it started; carries what was recorded so far
    #[error("Failed to test pipeline '{pipeline}': {source}")]
    Aborted {
        pipeline: String,
        #[source]
        source: PipelineApiError,
        result: Box<PipelineTestResult>,
    },
}

impl PipelineTestError {
    /// The partially filled result of an aborted run
    pub fn partial_result(&self) -> Option<&PipelineTestResult> {
        match self {
            PipelineTestError::Aborted { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn into_partial_result(self) -> Option<PipelineTestResult> {
        match self {
            PipelineTestError::Aborted { result, .. } => Some(*result),
            _ => None,
        }
    }
}

/// Errors that stop a batch as a whole
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("pipeline discovery failed: {0}")]
    Discovery(#[source] PipelineApiError),
    #[error("pipeline test task failed: {0}")]
    Task(String),
    #[error(transparent)]
    Report(#[from] ReportError),
}

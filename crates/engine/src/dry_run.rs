// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dry-run testing of a pipeline against its migrated GitHub repository
//!
//! A run temporarily points the live pipeline at GitHub, queues one build,
//! and restores the original binding right after queueing, before the build
//! is monitored. Any run that rewired the pipeline attempts a restore before
//! it returns, and a failed restore is escalated for manual follow-up.

use crate::error::PipelineTestError;
use crate::rewire::PipelineRewirer;
use mig_adapters::{PipelineApi, PipelineApiError};
use mig_core::{
    Clock, GithubTarget, PipelineBinding, PipelineScope, PipelineSelector, PipelineTestResult,
    STATUS_TIMED_OUT,
};
use std::time::Duration;
use tokio::time::Instant;

/// One pipeline to test
#[derive(Debug, Clone)]
pub struct DryRunRequest {
    pub scope: PipelineScope,
    pub selector: PipelineSelector,
    pub target: GithubTarget,
    pub monitor_timeout: Duration,
}

#[derive(Clone)]
pub struct DryRunEngine<P, C> {
    rewirer: PipelineRewirer<P>,
    clock: C,
    build_poll_interval: Duration,
}

impl<P: PipelineApi, C: Clock> DryRunEngine<P, C> {
    pub fn new(api: P, clock: C, build_poll_interval: Duration) -> Self {
        Self {
            rewirer: PipelineRewirer::new(api),
            clock,
            build_poll_interval,
        }
    }

    /// Resolve the selected pipeline and test it
    pub async fn test_pipeline(
        &self,
        request: &DryRunRequest,
    ) -> Result<PipelineTestResult, PipelineTestError> {
        let pipeline_id = self
            .rewirer
            .resolve_id(&request.scope, &request.selector)
            .await?;
        let name = request.selector.to_string();
        self.test_resolved(
            &request.scope,
            pipeline_id,
            &name,
            &request.target,
            request.monitor_timeout,
        )
        .await
    }

    /// Test a pipeline whose id is already known
    pub async fn test_resolved(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        pipeline_name: &str,
        target: &GithubTarget,
        monitor_timeout: Duration,
    ) -> Result<PipelineTestResult, PipelineTestError> {
        let mut result = PipelineTestResult::new(
            &scope.org,
            &scope.project,
            pipeline_name,
            pipeline_id,
            self.clock.now(),
        );
        result.pipeline_url = Some(self.rewirer.api().definition_url(scope, pipeline_id));
        tracing::info!(pipeline_id, "Starting test for pipeline '{}'", pipeline_name);

        let mut binding = None;
        let outcome = self
            .run(scope, target, monitor_timeout, &mut result, &mut binding)
            .await;

        match outcome {
            Ok(()) => Ok(result),
            Err(source) => {
                if result.needs_manual_restoration() {
                    if let Some(binding) = &binding {
                        self.restore(scope, binding, &mut result).await;
                    }
                }
                let abort = source.to_string();
                result.error_message = Some(match result.error_message.take() {
                    Some(earlier) => format!("{}; {}", earlier, abort),
                    None => abort,
                });
                result.end_time = Some(self.clock.now());
                tracing::error!(
                    pipeline_id,
                    error = %source,
                    "Failed to test pipeline '{}'",
                    pipeline_name
                );
                Err(PipelineTestError::Aborted {
                    pipeline: pipeline_name.to_string(),
                    source,
                    result: Box::new(result),
                })
            }
        }
    }

    async fn run(
        &self,
        scope: &PipelineScope,
        target: &GithubTarget,
        monitor_timeout: Duration,
        result: &mut PipelineTestResult,
        captured: &mut Option<PipelineBinding>,
    ) -> Result<(), PipelineApiError> {
        let pipeline_id = result.pipeline_id;
        let api = self.rewirer.api();

        if !api.is_pipeline_enabled(scope, pipeline_id).await? {
            tracing::warn!(pipeline_id, "Pipeline '{}' is disabled, skipping", result.pipeline_name);
            result.error_message = Some("Pipeline is disabled".to_string());
            result.end_time = Some(self.clock.now());
            return Ok(());
        }

        let binding = self.rewirer.capture_binding(scope, pipeline_id).await?;
        tracing::info!(
            pipeline_id,
            "Captured original binding (repository: {}, branch: {})",
            binding.repo_name,
            binding.default_branch
        );
        result.repo_name = Some(binding.repo_name.clone());
        let binding = captured.insert(binding);

        self.rewirer.rewire(scope, pipeline_id, target, binding).await?;
        result.rewired_successfully = true;
        tracing::info!(pipeline_id, "Pipeline rewired to {}/{}", target.org, target.repo);

        let build_id = api
            .queue_build(scope, pipeline_id, &binding.branch_ref())
            .await?;
        result.build_id = Some(build_id);
        let status = api.get_build_status(scope, build_id).await?;
        result.build_url = status.url;
        tracing::info!(pipeline_id, build_id, "Build queued");

        self.restore(scope, binding, result).await;

        self.monitor(scope, build_id, monitor_timeout, result).await
    }

    /// Put the captured binding back, escalating when that fails
    async fn restore(
        &self,
        scope: &PipelineScope,
        binding: &PipelineBinding,
        result: &mut PipelineTestResult,
    ) {
        let pipeline_id = result.pipeline_id;
        match self.rewirer.restore(scope, pipeline_id, binding).await {
            Ok(()) => {
                result.restored_successfully = true;
                tracing::info!(pipeline_id, "Pipeline restored to {}", binding.repo_name);
            }
            Err(e) => {
                result.error_message = Some(format!("Failed to restore: {}", e));
                tracing::error!(
                    pipeline_id,
                    error = %e,
                    "MANUAL RESTORATION REQUIRED: pipeline '{}' (ID: {}) still points at GitHub; \
                     restore repository '{}' at {}",
                    result.pipeline_name,
                    pipeline_id,
                    binding.repo_name,
                    result.pipeline_url.as_deref().unwrap_or_default()
                );
            }
        }
    }

    async fn monitor(
        &self,
        scope: &PipelineScope,
        build_id: u64,
        timeout: Duration,
        result: &mut PipelineTestResult,
    ) -> Result<(), PipelineApiError> {
        let api = self.rewirer.api();
        // None when the timeout is beyond what the clock can represent
        let deadline = Instant::now().checked_add(timeout);
        tracing::info!(build_id, "Monitoring build");

        loop {
            let status = api.get_build_status(scope, build_id).await?;
            result.status = status.status.clone();
            if status.url.is_some() {
                result.build_url = status.url.clone();
            }
            if status.is_finished() {
                result.result = status.result;
                result.end_time = Some(self.clock.now());
                tracing::info!(
                    build_id,
                    "Build for pipeline '{}' completed: {}",
                    result.pipeline_name,
                    result.result.as_deref().unwrap_or_default()
                );
                return Ok(());
            }

            let remaining = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    deadline - now
                }
                None => self.build_poll_interval,
            };
            tracing::info!(
                "Still waiting on pipeline '{}' (Build ID: {})",
                result.pipeline_name,
                build_id
            );
            tokio::time::sleep(self.build_poll_interval.min(remaining)).await;
        }

        result.status = Some(STATUS_TIMED_OUT.to_string());
        result.end_time = Some(self.clock.now());
        tracing::warn!(
            build_id,
            "Stopped monitoring pipeline '{}' after {}s without a result",
            result.pipeline_name,
            timeout.as_secs()
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "dry_run_tests.rs"]
mod tests;

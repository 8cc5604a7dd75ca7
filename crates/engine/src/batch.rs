// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch dry-run testing of every pipeline in a team project
//!
//! Discovery walks the enabled repositories, lists their pipelines, applies
//! the name filter and resolves ids. Discovery problems with one repository
//! or pipeline are recorded and skipped. Runs then execute with at most
//! `max_concurrency` in flight; results are collected in completion order.

use crate::dry_run::DryRunEngine;
use crate::error::{BatchError, ConfigError, PipelineTestError};
use mig_adapters::{PipelineApi, ReportSink};
use mig_core::{
    Clock, GithubTarget, PipelineFilter, PipelineScope, PipelineTestResult, PipelineTestSummary,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// A pipeline selected for testing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineCandidate {
    pub id: u64,
    /// Qualified name, including the folder
    pub name: String,
    pub repo_name: String,
}

/// Something discovery could not enumerate or resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDiscovery {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub candidates: Vec<PipelineCandidate>,
    pub skipped: Vec<SkippedDiscovery>,
}

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub scope: PipelineScope,
    pub target: GithubTarget,
    pub filter: PipelineFilter,
    pub max_concurrency: usize,
    pub monitor_timeout: Duration,
    pub report_path: PathBuf,
}

pub struct BatchOrchestrator<P, C, R> {
    engine: DryRunEngine<P, C>,
    api: P,
    clock: C,
    reports: R,
}

impl<P: PipelineApi, C: Clock, R: ReportSink> BatchOrchestrator<P, C, R> {
    pub fn new(api: P, clock: C, reports: R, build_poll_interval: Duration) -> Self {
        Self {
            engine: DryRunEngine::new(api.clone(), clock.clone(), build_poll_interval),
            api,
            clock,
            reports,
        }
    }

    /// Enumerate the pipelines of a team project that match `filter`
    pub async fn discover(
        &self,
        scope: &PipelineScope,
        filter: &PipelineFilter,
    ) -> Result<Discovery, BatchError> {
        let repositories = self
            .api
            .get_enabled_repositories(scope)
            .await
            .map_err(BatchError::Discovery)?;
        tracing::info!(count = repositories.len(), "Found enabled repositories in {}", scope);

        let mut discovery = Discovery::default();
        for repository in repositories {
            let names = match self
                .api
                .get_pipelines_for_repository(scope, &repository.id)
                .await
            {
                Ok(names) => names,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Unable to list pipelines for repository {}, skipping",
                        repository.name
                    );
                    discovery.skipped.push(SkippedDiscovery {
                        name: repository.name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for name in names.into_iter().filter(|n| selected(filter, n)) {
                match self.api.get_pipeline_id(scope, &name).await {
                    Ok(id) => discovery.candidates.push(PipelineCandidate {
                        id,
                        name,
                        repo_name: repository.name.clone(),
                    }),
                    Err(e) => {
                        tracing::warn!(error = %e, "Unable to resolve pipeline {}, skipping", name);
                        discovery.skipped.push(SkippedDiscovery {
                            name,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        tracing::info!(
            candidates = discovery.candidates.len(),
            skipped = discovery.skipped.len(),
            "Pipeline discovery complete"
        );
        Ok(discovery)
    }

    /// Discover, test and report
    ///
    /// Returns `Ok(None)` when nothing matched; no report is written then.
    /// When the batch itself fails, a partial report of the results gathered
    /// so far is written before the error is returned.
    pub async fn run(
        &self,
        request: &BatchRequest,
    ) -> Result<Option<PipelineTestSummary>, BatchError> {
        if request.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency.into());
        }
        let started = Instant::now();
        let results = Arc::new(Mutex::new(Vec::new()));

        let outcome = match self.discover(&request.scope, &request.filter).await {
            Ok(discovery) if discovery.candidates.is_empty() => {
                tracing::warn!("No pipelines found matching the criteria");
                return Ok(None);
            }
            Ok(discovery) => self.execute(request, discovery.candidates, &results).await,
            Err(e) => Err(e),
        };

        let collected = std::mem::take(&mut *results.lock().unwrap_or_else(|e| e.into_inner()));
        let summary = PipelineTestSummary::from_results(collected, started.elapsed());

        if let Err(e) = outcome {
            tracing::error!(error = %e, "Pipeline batch test failed, writing partial report");
            if let Err(report_err) = self
                .reports
                .write_report(&request.report_path, &summary)
                .await
            {
                tracing::error!(error = %report_err, "Unable to write partial report");
            }
            return Err(e);
        }

        log_summary(&summary);
        self.reports
            .write_report(&request.report_path, &summary)
            .await?;
        tracing::info!("Report written to {}", request.report_path.display());
        Ok(Some(summary))
    }

    async fn execute(
        &self,
        request: &BatchRequest,
        candidates: Vec<PipelineCandidate>,
        results: &Arc<Mutex<Vec<PipelineTestResult>>>,
    ) -> Result<(), BatchError> {
        let total = candidates.len();
        tracing::info!(
            total,
            max_concurrency = request.max_concurrency,
            "Testing pipelines"
        );

        let permits = Arc::new(Semaphore::new(request.max_concurrency));
        let mut tasks = JoinSet::new();
        let mut first_error = None;
        for candidate in candidates {
            let permit = match Arc::clone(&permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    first_error = Some(BatchError::Task(e.to_string()));
                    break;
                }
            };
            let engine = self.engine.clone();
            let clock = self.clock.clone();
            let scope = request.scope.clone();
            let target = request.target.clone();
            let timeout = request.monitor_timeout;
            let results = Arc::clone(results);

            tasks.spawn(async move {
                let _permit = permit;
                let outcome = engine
                    .test_resolved(&scope, candidate.id, &candidate.name, &target, timeout)
                    .await;
                let result = outcome_to_result(outcome, &scope, &candidate, &clock);
                let mut results = results.lock().unwrap_or_else(|e| e.into_inner());
                results.push(result);
                tracing::info!(
                    "Completed {}/{}: {}",
                    results.len(),
                    total,
                    candidate.name
                );
            });
        }

        // Every started run must finish; dropping the set would abort runs
        // that may sit between rewire and restore.
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Pipeline test task failed");
                first_error.get_or_insert(BatchError::Task(e.to_string()));
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Filters apply to the qualified name or to the bare pipeline name
fn selected(filter: &PipelineFilter, qualified_name: &str) -> bool {
    let bare = qualified_name
        .rsplit('\\')
        .next()
        .unwrap_or(qualified_name);
    filter.matches(qualified_name) || filter.matches(bare)
}

/// Fold a failed run into a result so it is counted in the summary
fn outcome_to_result<C: Clock>(
    outcome: Result<PipelineTestResult, PipelineTestError>,
    scope: &PipelineScope,
    candidate: &PipelineCandidate,
    clock: &C,
) -> PipelineTestResult {
    match outcome {
        Ok(result) => result,
        Err(e) => {
            let message = e.to_string();
            e.into_partial_result().unwrap_or_else(|| {
                let mut result = PipelineTestResult::new(
                    &scope.org,
                    &scope.project,
                    &candidate.name,
                    candidate.id,
                    clock.now(),
                );
                result.end_time = Some(clock.now());
                result.repo_name = Some(candidate.repo_name.clone());
                result.error_message = Some(message);
                result
            })
        }
    }
}

fn log_summary(summary: &PipelineTestSummary) {
    tracing::info!("=== PIPELINE BATCH TEST SUMMARY ===");
    tracing::info!("Total pipelines tested: {}", summary.total_pipelines);
    tracing::info!("Successful builds: {}", summary.successful_builds);
    tracing::info!("Failed builds: {}", summary.failed_builds);
    tracing::info!("Timed out builds: {}", summary.timed_out_builds);
    tracing::info!("Rewiring errors: {}", summary.errors_rewiring);
    tracing::info!("Restoration errors: {}", summary.errors_restoring);
    tracing::info!("Success rate: {:.1}%", summary.success_rate);
    tracing::info!(
        "Total test time: {}",
        humantime::format_duration(whole_seconds(summary.total_test_time))
    );

    let stranded: Vec<_> = summary.requiring_manual_restoration().collect();
    if !stranded.is_empty() {
        tracing::warn!("PIPELINES REQUIRING MANUAL RESTORATION:");
        for result in stranded {
            tracing::warn!(
                "  {} (ID: {}) repository: {} url: {}",
                result.pipeline_name,
                result.pipeline_id,
                result.repo_name.as_deref().unwrap_or("unknown"),
                result.pipeline_url.as_deref().unwrap_or_default()
            );
        }
    }
}

fn whole_seconds(duration: Duration) -> Duration {
    Duration::from_secs(duration.as_secs())
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;

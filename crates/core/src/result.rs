// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline test results and batch summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status recorded when monitoring gives up before the build finishes
pub const STATUS_TIMED_OUT: &str = "timedOut";

/// Outcome of one dry-run test of one pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTestResult {
    pub ado_org: String,
    pub ado_team_project: String,
    pub pipeline_name: String,
    pub pipeline_id: u64,
    pub pipeline_url: Option<String>,
    pub repo_name: Option<String>,
    pub rewired_successfully: bool,
    pub restored_successfully: bool,
    pub build_id: Option<u64>,
    pub build_url: Option<String>,
    pub status: Option<String>,
    pub result: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl PipelineTestResult {
    pub fn new(
        ado_org: impl Into<String>,
        ado_team_project: impl Into<String>,
        pipeline_name: impl Into<String>,
        pipeline_id: u64,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            ado_org: ado_org.into(),
            ado_team_project: ado_team_project.into(),
            pipeline_name: pipeline_name.into(),
            pipeline_id,
            pipeline_url: None,
            repo_name: None,
            rewired_successfully: false,
            restored_successfully: false,
            build_id: None,
            build_url: None,
            status: None,
            result: None,
            start_time,
            end_time: None,
            error_message: None,
        }
    }

    fn result_is(&self, candidates: &[&str]) -> bool {
        self.result
            .as_deref()
            .is_some_and(|r| candidates.iter().any(|c| r.eq_ignore_ascii_case(c)))
    }

    fn status_is(&self, candidates: &[&str]) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| candidates.iter().any(|c| s.eq_ignore_ascii_case(c)))
    }

    pub fn is_successful(&self) -> bool {
        self.result_is(&["succeeded", "partiallySucceeded"])
    }

    pub fn is_failed(&self) -> bool {
        self.result_is(&["failed", "canceled"])
    }

    pub fn is_completed(&self) -> bool {
        self.result.as_deref().is_some_and(|r| !r.is_empty())
    }

    pub fn is_running(&self) -> bool {
        self.status_is(&["inProgress", "notStarted"])
    }

    /// Monitoring stopped before the build reported a result
    pub fn is_timed_out(&self) -> bool {
        !self.is_completed() && self.status_is(&[STATUS_TIMED_OUT])
    }

    /// The live pipeline was rewired and never put back
    pub fn needs_manual_restoration(&self) -> bool {
        self.rewired_successfully && !self.restored_successfully
    }

    pub fn build_duration(&self) -> Option<chrono::Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}

/// Aggregate over one batch of pipeline tests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTestSummary {
    pub total_pipelines: usize,
    pub successful_builds: usize,
    pub failed_builds: usize,
    pub timed_out_builds: usize,
    pub errors_rewiring: usize,
    pub errors_restoring: usize,
    #[serde(with = "humantime_serde")]
    pub total_test_time: Duration,
    pub success_rate: f64,
    /// In completion order, not discovery order
    pub results: Vec<PipelineTestResult>,
}

impl PipelineTestSummary {
    pub fn from_results(results: Vec<PipelineTestResult>, total_test_time: Duration) -> Self {
        let mut summary = Self {
            total_test_time,
            ..Self::default()
        };
        summary.add_results(results);
        summary
    }

    /// Append results and recompute every count
    pub fn add_results(&mut self, results: impl IntoIterator<Item = PipelineTestResult>) {
        self.results.extend(results);

        let results = &self.results;
        self.total_pipelines = results.len();
        self.successful_builds = results.iter().filter(|r| r.is_successful()).count();
        self.failed_builds = results.iter().filter(|r| r.is_failed()).count();
        self.timed_out_builds = results.iter().filter(|r| r.is_timed_out()).count();
        self.errors_rewiring = results.iter().filter(|r| !r.rewired_successfully).count();
        self.errors_restoring = results
            .iter()
            .filter(|r| r.needs_manual_restoration())
            .count();
        self.success_rate = success_rate(self.successful_builds, self.total_pipelines);
    }

    pub fn requiring_manual_restoration(&self) -> impl Iterator<Item = &PipelineTestResult> {
        self.results.iter().filter(|r| r.needs_manual_restoration())
    }
}

/// Percentage of successful runs, 0 for an empty batch
pub fn success_rate(successful: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    successful as f64 / total as f64 * 100.0
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;

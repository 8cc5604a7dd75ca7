// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use mig_core::{PipelineTestResult, PipelineTestSummary};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// How a single dry run turned out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
    Unknown,
}

impl Verdict {
    pub fn of(result: &PipelineTestResult) -> Self {
        match result.result.as_deref() {
            Some(r) if r.eq_ignore_ascii_case("succeeded") => Verdict::Passed,
            Some(r) if r.eq_ignore_ascii_case("failed") => Verdict::Failed,
            _ if result.error_message.is_some() => Verdict::Failed,
            _ => Verdict::Unknown,
        }
    }
}

/// The report printed after a single dry run
#[derive(Serialize)]
#[serde(transparent)]
pub struct DryRunReport<'a>(pub &'a PipelineTestResult);

impl fmt::Display for DryRunReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        writeln!(f, "=== PIPELINE TEST REPORT ===")?;
        writeln!(f, "ADO Organization: {}", result.ado_org)?;
        writeln!(f, "ADO Team Project: {}", result.ado_team_project)?;
        writeln!(f, "Pipeline Name: {}", result.pipeline_name)?;
        writeln!(
            f,
            "Build Result: {}",
            result.result.as_deref().unwrap_or("not completed")
        )?;
        if let Some(url) = &result.build_url {
            writeln!(f, "Build URL: {}", url)?;
        }
        if let Some(duration) = result.build_duration() {
            writeln!(f, "Duration: {}s", duration.num_seconds())?;
        }
        match Verdict::of(result) {
            Verdict::Passed => write!(f, "Pipeline test PASSED - Build completed successfully"),
            Verdict::Failed => match (&result.result, &result.error_message) {
                (None, Some(error)) => write!(f, "Pipeline test FAILED - Error: {}", error),
                _ => write!(f, "Pipeline test FAILED - Build completed with failures"),
            },
            Verdict::Unknown => write!(f, "Pipeline test completed with unknown result"),
        }
    }
}

/// One-line batch outcome printed after the report is written
#[derive(Serialize)]
#[serde(transparent)]
pub struct BatchOutcome<'a>(pub &'a PipelineTestSummary);

impl fmt::Display for BatchOutcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        write!(
            f,
            "Tested {} pipelines: {} succeeded, {} failed, {} timed out ({:.1}% success)",
            summary.total_pipelines,
            summary.successful_builds,
            summary.failed_builds,
            summary.timed_out_builds,
            summary.success_rate
        )
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

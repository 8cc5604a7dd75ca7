// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON report files

use super::{ReportError, ReportSink};
use async_trait::async_trait;
use mig_core::PipelineTestSummary;
use std::path::Path;

/// Writes summaries as pretty-printed JSON, creating parent directories
#[derive(Clone, Default)]
pub struct FileReportSink;

impl FileReportSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn write_report(
        &self,
        path: &Path,
        summary: &PipelineTestSummary,
    ) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(summary)
            .map_err(|e| ReportError::Serialize(e.to_string()))?;
        let write_err = |e: std::io::Error| ReportError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        tokio::fs::write(path, json).await.map_err(write_err)?;
        tracing::info!(path = %path.display(), results = summary.total_pipelines, "report written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;

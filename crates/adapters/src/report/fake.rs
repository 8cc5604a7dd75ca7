// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake report sink for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ReportError, ReportSink};
use async_trait::async_trait;
use mig_core::PipelineTestSummary;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Keeps written reports in memory
#[derive(Clone, Default)]
pub struct FakeReportSink {
    reports: Arc<Mutex<Vec<(PathBuf, PipelineTestSummary)>>>,
    fail: Arc<Mutex<bool>>,
}

impl FakeReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every report written so far, oldest first
    pub fn reports(&self) -> Vec<(PathBuf, PipelineTestSummary)> {
        self.reports.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }
}

#[async_trait]
impl ReportSink for FakeReportSink {
    async fn write_report(
        &self,
        path: &Path,
        summary: &PipelineTestSummary,
    ) -> Result<(), ReportError> {
        if *self.fail.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(ReportError::Write {
                path: path.display().to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((path.to_path_buf(), summary.clone()));
        Ok(())
    }
}

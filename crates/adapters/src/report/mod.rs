// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch report persistence

mod file;

pub use file::FileReportSink;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeReportSink;

use async_trait::async_trait;
use mig_core::PipelineTestSummary;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(String),
    #[error("failed to write report {path}: {message}")]
    Write { path: String, message: String },
}

/// Destination for batch test summaries
#[async_trait]
pub trait ReportSink: Clone + Send + Sync + 'static {
    async fn write_report(
        &self,
        path: &Path,
        summary: &PipelineTestSummary,
    ) -> Result<(), ReportError>;
}

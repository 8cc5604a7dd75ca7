// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the remote platforms and the report file

pub mod cache;
pub mod http;
pub mod migration;
pub mod pipeline;
pub mod report;
pub mod traced;

pub use cache::InventoryCache;
pub use http::HttpError;
pub use migration::{GithubMigrationApi, MigrationApi, MigrationApiError};
pub use pipeline::{AdoPipelineApi, PipelineApi, PipelineApiError};
pub use report::{FileReportSink, ReportError, ReportSink};
pub use traced::{TracedMigrationApi, TracedPipelineApi};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use migration::{FakeMigrationApi, MigrationCall};
#[cfg(any(test, feature = "test-support"))]
pub use pipeline::{FakePipeline, FakePipelineApi, PipelineCall};
#[cfg(any(test, feature = "test-support"))]
pub use report::FakeReportSink;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mig-core: domain types for the migration orchestration CLI
//!
//! This crate provides:
//! - Migration records and state classifiers for repository and organization migrations
//! - Pipeline identity, binding snapshots, and name lookup
//! - Pipeline test results and batch summaries
//! - The retry policy shared by every poller

pub mod clock;
pub mod filter;
pub mod migration;
pub mod pipeline;
pub mod result;
pub mod retry;

pub use clock::{Clock, FakeClock, SystemClock};
pub use filter::PipelineFilter;
pub use migration::{
    MigrationKind, MigrationRecord, OrganizationMigration, OrganizationMigrationRequest,
    OrganizationMigrationState, RepositoryMigration, RepositoryMigrationRequest,
    RepositoryMigrationState,
};
pub use pipeline::{
    BuildStatus, GithubTarget, PipelineBinding, PipelineDefinition, PipelineIndex,
    PipelineRepository, PipelineScope, PipelineSelector, PipelineSettings, SelectorError,
    SourceRepository,
};
pub use result::{PipelineTestResult, PipelineTestSummary, STATUS_TIMED_OUT};
pub use retry::{Backoff, RetryOutcome, RetryPolicy};

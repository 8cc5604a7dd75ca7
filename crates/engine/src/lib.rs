// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Migration orchestration engine

mod batch;
mod config;
mod dry_run;
mod error;
mod poller;
mod rewire;
#[cfg(test)]
mod test_logs;

pub use batch::{BatchOrchestrator, BatchRequest, Discovery, PipelineCandidate, SkippedDiscovery};
pub use config::EngineConfig;
pub use dry_run::{DryRunEngine, DryRunRequest};
pub use error::{BatchError, ConfigError, MigrationError, PipelineTestError};
pub use poller::{warnings_message, MigrationPoller};
pub use rewire::PipelineRewirer;

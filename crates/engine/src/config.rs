// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine timing and concurrency settings

use crate::error::ConfigError;
use mig_core::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Wait between migration status checks
    #[serde(with = "humantime_serde")]
    pub migration_poll_interval: Duration,
    /// Wait between build status checks
    #[serde(with = "humantime_serde")]
    pub build_poll_interval: Duration,
    /// How long to watch a queued build before giving up
    #[serde(with = "humantime_serde")]
    pub monitor_timeout: Duration,
    /// Pipeline tests allowed to run at once in a batch
    pub max_concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            migration_poll_interval: Duration::from_secs(10),
            build_poll_interval: Duration::from_secs(30),
            monitor_timeout: Duration::from_secs(30 * 60),
            max_concurrency: 3,
            retry: RetryPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

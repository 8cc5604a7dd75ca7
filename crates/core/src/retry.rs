// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retry for remote state that is not available yet
//!
//! Two flavors:
//! - [`RetryPolicy::retry_on_result`] re-runs a query while it keeps
//!   returning a sentinel ("not populated yet") value. Errors from the
//!   query are propagated immediately.
//! - [`RetryPolicy::retry`] re-runs an operation while it fails with an
//!   error the caller classifies as retryable.
//!
//! Both use an attempt budget rather than a wall-clock timeout and suspend
//! on the tokio timer between attempts, so dropping the returned future
//! cancels the wait.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How the wait between attempts grows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// Same interval before every retry
    #[default]
    Fixed,
    /// `interval * n` before the n-th retry
    Linear,
}

/// Outcome of [`RetryPolicy::retry_on_result`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    /// The operation produced a non-sentinel value
    Successful(T),
    /// Every attempt returned the sentinel
    Failure,
}

impl<T> RetryOutcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            RetryOutcome::Successful(value) => Some(value),
            RetryOutcome::Failure => None,
        }
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, RetryOutcome::Successful(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total invocations, including the first
    pub max_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            interval: Duration::from_secs(4),
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            backoff: Backoff::Fixed,
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay after the given 1-based failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Linear => self.interval.saturating_mul(attempt.max(1)),
        }
    }

    /// Invoke `operation` until it returns something other than `sentinel`
    ///
    /// Logs `message` before each wait. An `Err` from the operation is
    /// returned as-is without further attempts.
    pub async fn retry_on_result<T, E, F, Fut>(
        &self,
        mut operation: F,
        sentinel: &T,
        message: &str,
    ) -> Result<RetryOutcome<T>, E>
    where
        T: PartialEq,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        for attempt in 1..=self.max_attempts {
            let value = operation().await?;
            if value != *sentinel {
                return Ok(RetryOutcome::Successful(value));
            }
            if attempt < self.max_attempts {
                tracing::info!(attempt, "{}", message);
                tokio::time::sleep(self.delay_for(attempt)).await;
            }
        }
        tracing::debug!(attempts = self.max_attempts, "retry budget exhausted");
        Ok(RetryOutcome::Failure)
    }

    /// Invoke `operation` until it succeeds or fails with a non-retryable error
    ///
    /// Runs at least once. The last error is returned when the budget runs out.
    pub async fn retry<T, E, F, Fut, P>(&self, mut operation: F, is_retryable: P) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && is_retryable(&e) => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Known failure shapes carry what went wrong, why it might have happened,
//! and how to fix it.

use mig_core::{PipelineTestResult, SelectorError};
use std::fmt;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Builders for the failures users hit most often.
impl CliError {
    /// No token was given by flag or environment
    pub fn missing_token(env_var: &str, flag: &str) -> Self {
        CliError::new(format!("No personal access token found for {}", env_var))
            .with_context(format!("Neither {} nor the {} environment variable is set", flag, env_var))
            .with_suggestion(format!("Export the token: export {}=<token>", env_var))
            .with_suggestion(format!("Or pass it explicitly: {} <token>", flag))
    }

    /// `--ado-pipeline` and `--ado-pipeline-id` given together or not at all
    pub fn pipeline_selector(error: SelectorError) -> Self {
        let message = match error {
            SelectorError::Both => {
                "Cannot specify both --ado-pipeline and --ado-pipeline-id. Please use only one."
            }
            SelectorError::Neither => "Either --ado-pipeline or --ado-pipeline-id must be specified",
        };
        CliError::new(message).with_source(error)
    }

    pub fn invalid_config(path: &str, reason: impl fmt::Display) -> Self {
        CliError::new(format!("Invalid configuration file {}", path))
            .with_context(reason.to_string())
            .with_suggestion("Durations use humantime syntax, e.g. monitor_timeout = \"45m\"")
    }

    pub fn invalid_filter(pattern: &str, reason: impl fmt::Display) -> Self {
        CliError::new(format!("Invalid pipeline filter '{}'", pattern))
            .with_context(reason.to_string())
            .with_suggestion("Use * and ? wildcards, e.g. --pipeline-filter \"CI-*\"")
    }

    /// The log file would clobber an existing file
    pub fn file_exists(path: &str) -> Self {
        CliError::new(format!(
            "File {} already exists! Use --overwrite to overwrite this file.",
            path
        ))
    }

    /// One or more pipelines were left pointing at GitHub
    pub fn manual_restoration(results: &[&PipelineTestResult]) -> Self {
        let mut err = CliError::new(format!(
            "{} pipeline(s) still point at GitHub and need manual restoration",
            results.len()
        ));
        for result in results {
            err = err.with_context(format!(
                "{} (ID: {}) originally built {}: {}",
                result.pipeline_name,
                result.pipeline_id,
                result.repo_name.as_deref().unwrap_or("an unknown repository"),
                result.pipeline_url.as_deref().unwrap_or_default()
            ));
        }
        err.with_suggestion("Open each pipeline URL and point it back at its original repository")
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

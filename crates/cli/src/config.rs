// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file and credential resolution

use crate::error::CliError;
use mig_engine::EngineConfig;
use std::path::Path;

pub const DEFAULT_ADO_SERVER_URL: &str = "https://dev.azure.com";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

pub const ADO_PAT_ENV: &str = "ADO_PAT";
pub const GH_PAT_ENV: &str = "GH_PAT";
pub const GH_SOURCE_PAT_ENV: &str = "GH_SOURCE_PAT";

/// Load engine settings from an optional TOML file
///
/// Missing keys keep their defaults.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::invalid_config(&display, e))?;
    parse_engine_config(&content).map_err(|e| CliError::invalid_config(&display, e))
}

pub fn parse_engine_config(content: &str) -> Result<EngineConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Token from the flag, falling back to the environment
pub fn resolve_token(flag_value: Option<&str>, env_var: &str, flag: &str) -> Result<String, CliError> {
    resolve_token_with(flag_value, env_var, flag, |name| std::env::var(name).ok())
}

fn resolve_token_with(
    flag_value: Option<&str>,
    env_var: &str,
    flag: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, CliError> {
    flag_value
        .map(str::to_string)
        .or_else(|| lookup(env_var))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| CliError::missing_token(env_var, flag))
}

/// Optional token that is never required
pub fn optional_token(flag_value: Option<&str>, env_var: &str) -> Option<String> {
    flag_value
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|token| !token.trim().is_empty())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

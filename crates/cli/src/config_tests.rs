// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn no_config_file_uses_defaults() {
    assert_eq!(load_engine_config(None).unwrap(), EngineConfig::default());
}

#[test]
fn toml_overrides_selected_settings() {
    let config = parse_engine_config(
        r#"
        build_poll_interval = "15s"
        max_concurrency = 5

        [retry]
        max_attempts = 3
        backoff = "linear"
        "#,
    )
    .unwrap();

    assert_eq!(config.build_poll_interval, Duration::from_secs(15));
    assert_eq!(config.max_concurrency, 5);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.monitor_timeout, Duration::from_secs(1800));
}

#[test]
fn config_file_is_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mig.toml");
    std::fs::write(&path, "monitor_timeout = \"1h\"\n").unwrap();

    let config = load_engine_config(Some(&path)).unwrap();

    assert_eq!(config.monitor_timeout, Duration::from_secs(3600));
}

#[test]
fn malformed_duration_is_reported_with_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mig.toml");
    std::fs::write(&path, "monitor_timeout = \"soon\"\n").unwrap();

    let err = load_engine_config(Some(&path)).unwrap_err();

    assert!(err.message.contains("mig.toml"));
}

#[test]
fn flag_token_wins_over_environment() {
    let token = resolve_token_with(Some("from-flag"), "ADO_PAT", "--ado-pat", |_| {
        Some("from-env".to_string())
    })
    .unwrap();
    assert_eq!(token, "from-flag");
}

#[test]
fn environment_token_is_used_when_flag_is_absent() {
    let token = resolve_token_with(None, "GH_PAT", "--github-pat", |name| {
        (name == "GH_PAT").then(|| "from-env".to_string())
    })
    .unwrap();
    assert_eq!(token, "from-env");
}

#[test]
fn blank_token_counts_as_missing() {
    let err = resolve_token_with(None, "GH_PAT", "--github-pat", |_| Some("  ".to_string()))
        .unwrap_err();
    assert!(err.message.contains("GH_PAT"));
}

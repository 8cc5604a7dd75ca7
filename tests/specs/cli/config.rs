// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file specs

use crate::prelude::*;

#[test]
fn malformed_config_file_is_reported() {
    let project = Project::empty();
    project.file("mig.toml", "monitor_timeout = \"whenever\"\n");

    project
        .mig()
        .args(["--config", "mig.toml", "wait-for-migration", "--migration-id", "RM_1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration file mig.toml"));
}

#[test]
fn missing_config_file_is_reported() {
    let project = Project::empty();

    project
        .mig()
        .args(["--config", "absent.toml", "wait-for-migration", "--migration-id", "RM_1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn zero_concurrency_in_config_is_rejected() {
    let project = Project::empty();
    project.file("mig.toml", "max_concurrency = 0\n");

    project
        .mig()
        .args(["--config", "mig.toml", "wait-for-migration", "--migration-id", "RM_1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_concurrency must be at least 1"));
}

#[test]
fn valid_config_file_is_accepted() {
    let project = Project::empty();
    project.file(
        "mig.toml",
        "migration_poll_interval = \"5s\"\n\n[retry]\nmax_attempts = 2\n",
    );

    // Gets past config loading and stops at the missing token
    project
        .mig()
        .args(["--config", "mig.toml", "wait-for-migration", "--migration-id", "RM_1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GH_PAT"));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Help and version output specs

use crate::prelude::*;

#[test]
fn help_lists_every_command() {
    mig()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("wait-for-migration"))
        .stdout(predicate::str::contains("migrate-org"))
        .stdout(predicate::str::contains("download-logs"))
        .stdout(predicate::str::contains("rewire-pipeline"))
        .stdout(predicate::str::contains("test-pipelines"));
}

#[test]
fn version_is_printed() {
    mig()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("mig "));
}

#[test]
fn rewire_help_documents_dry_run_flags() {
    mig()
        .args(["rewire-pipeline", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--monitor-timeout-minutes"))
        .stdout(predicate::str::contains("--ado-pipeline-id"))
        .stdout(predicate::str::contains("--target-api-url"));
}

#[test]
fn test_pipelines_help_documents_batch_flags() {
    mig()
        .args(["test-pipelines", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--pipeline-filter"))
        .stdout(predicate::str::contains("--max-concurrent-tests"))
        .stdout(predicate::str::contains("--report-path"))
        .stdout(predicate::str::contains("--target-api-url"));
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    mig().assert().failure().stderr(predicate::str::contains("Usage"));
}

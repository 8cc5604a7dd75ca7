// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Migration command specs

use crate::prelude::*;

#[test]
fn unknown_migration_id_prefix_is_rejected() {
    mig()
        .args(["wait-for-migration", "--migration-id", "XYZ_123"])
        .env("GH_PAT", "token")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid migration id: XYZ_123"));
}

#[test]
fn invalid_id_is_reported_even_without_a_token() {
    mig()
        .args(["wait-for-migration", "--migration-id", "123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid migration id: 123"));
}

#[test]
fn waiting_requires_a_github_token() {
    mig()
        .args(["wait-for-migration", "--migration-id", "RM_abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GH_PAT"))
        .stderr(predicate::str::contains("--github-pat"));
}

#[test]
fn org_migration_requires_a_github_token() {
    mig()
        .args([
            "migrate-org",
            "--github-source-org",
            "old",
            "--github-target-org",
            "new",
            "--github-target-enterprise",
            "acme",
            "--queue-only",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GH_PAT"));
}

#[test]
fn existing_log_file_is_not_overwritten() {
    let project = Project::empty();
    project.file("migration-log-acme-payments.log", "previous log");

    project
        .mig()
        .args(["download-logs", "--github-org", "acme", "--github-repo", "payments"])
        .env("GH_PAT", "token")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "already exists! Use --overwrite to overwrite this file.",
        ));

    let content =
        std::fs::read_to_string(project.path().join("migration-log-acme-payments.log")).unwrap();
    assert_eq!(content, "previous log");
}

#[test]
fn custom_log_file_is_checked_too() {
    let project = Project::empty();
    project.file("logs/payments.log", "previous log");

    project
        .mig()
        .args([
            "download-logs",
            "--github-org",
            "acme",
            "--github-repo",
            "payments",
            "--migration-log-file",
            "logs/payments.log",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("logs/payments.log already exists!"));
}

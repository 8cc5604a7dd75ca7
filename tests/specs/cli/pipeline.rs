// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline command argument validation specs

use crate::prelude::*;

#[test]
fn name_and_id_together_are_rejected() {
    mig()
        .arg("rewire-pipeline")
        .args(REWIRE_TARGET)
        .args(["--ado-pipeline", "CI", "--ado-pipeline-id", "42"])
        .env("ADO_PAT", "token")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Cannot specify both --ado-pipeline and --ado-pipeline-id. Please use only one.",
        ));
}

#[test]
fn a_pipeline_selector_is_required() {
    mig()
        .arg("rewire-pipeline")
        .args(REWIRE_TARGET)
        .env("ADO_PAT", "token")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Either --ado-pipeline or --ado-pipeline-id must be specified",
        ));
}

#[test]
fn blank_pipeline_name_counts_as_missing() {
    mig()
        .arg("rewire-pipeline")
        .args(REWIRE_TARGET)
        .args(["--ado-pipeline", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Either --ado-pipeline or --ado-pipeline-id must be specified",
        ));
}

#[test]
fn missing_ado_token_is_explained() {
    mig()
        .arg("rewire-pipeline")
        .args(REWIRE_TARGET)
        .args(["--ado-pipeline-id", "42", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ADO_PAT"))
        .stderr(predicate::str::contains("--ado-pat"));
}

#[test]
fn non_numeric_pipeline_id_is_a_usage_error() {
    mig()
        .arg("rewire-pipeline")
        .args(REWIRE_TARGET)
        .args(["--ado-pipeline-id", "forty-two"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--ado-pipeline-id"));
}

#[test]
fn zero_concurrency_is_rejected_before_any_request() {
    mig()
        .arg("test-pipelines")
        .args(REWIRE_TARGET)
        .args(["--max-concurrent-tests", "0"])
        .env("ADO_PAT", "token")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_concurrency must be at least 1"));
}

#[test]
fn batch_requires_an_ado_token() {
    mig()
        .arg("test-pipelines")
        .args(REWIRE_TARGET)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ADO_PAT"));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;

fn result() -> PipelineTestResult {
    PipelineTestResult::new("contoso", "payments", "\\CI", 42, Utc::now())
}

#[test]
fn succeeded_build_passes() {
    let mut r = result();
    r.result = Some("succeeded".to_string());

    let text = DryRunReport(&r).to_string();

    assert_eq!(Verdict::of(&r), Verdict::Passed);
    assert!(text.starts_with("=== PIPELINE TEST REPORT ==="));
    assert!(text.contains("Build Result: succeeded"));
    assert!(text.contains("Pipeline test PASSED"));
}

#[test]
fn failed_build_fails() {
    let mut r = result();
    r.result = Some("failed".to_string());

    assert_eq!(Verdict::of(&r), Verdict::Failed);
    assert!(DryRunReport(&r).to_string().contains("Build completed with failures"));
}

#[test]
fn error_without_result_fails_with_the_error() {
    let mut r = result();
    r.error_message = Some("Pipeline is disabled".to_string());

    let text = DryRunReport(&r).to_string();

    assert_eq!(Verdict::of(&r), Verdict::Failed);
    assert!(text.contains("Build Result: not completed"));
    assert!(text.contains("Pipeline test FAILED - Error: Pipeline is disabled"));
}

#[test]
fn other_results_are_unknown() {
    let mut r = result();
    r.result = Some("canceled".to_string());

    assert_eq!(Verdict::of(&r), Verdict::Unknown);
    assert!(DryRunReport(&r).to_string().contains("completed with unknown result"));
}

#[test]
fn json_report_uses_camel_case_fields() {
    let r = result();
    let json = serde_json::to_value(DryRunReport(&r)).unwrap();
    assert_eq!(json["pipelineId"], 42);
    assert_eq!(json["adoTeamProject"], "payments");
}

#[test]
fn batch_outcome_formats_rate_with_one_decimal() {
    let mut succeeded = result();
    succeeded.result = Some("succeeded".to_string());
    let mut failed = result();
    failed.result = Some("failed".to_string());
    let summary = PipelineTestSummary::from_results(
        vec![succeeded.clone(), succeeded.clone(), succeeded, failed],
        std::time::Duration::from_secs(90),
    );

    let text = BatchOutcome(&summary).to_string();

    assert_eq!(
        text,
        "Tested 4 pipelines: 3 succeeded, 1 failed, 0 timed out (75.0% success)"
    );
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn scope() -> PipelineScope {
    PipelineScope::new("contoso", "payments")
}

fn target() -> GithubTarget {
    GithubTarget::new("acme", "payments", "svc")
}

#[tokio::test]
async fn rewire_then_restore_round_trips_binding() {
    let api = FakePipelineApi::new();
    api.add_pipeline(FakePipeline::new(1, "CI", "payments").with_triggers(json!([{ "t": 1 }])));
    let original = api.pipeline(1).unwrap().binding();

    api.rewire_pipeline(&scope(), 1, &target(), &original.settings())
        .await
        .unwrap();
    assert!(api.pipeline(1).unwrap().github.is_some());

    api.restore_pipeline(&scope(), 1, &original).await.unwrap();
    let restored = api.pipeline(1).unwrap();
    assert!(restored.github.is_none());
    assert_eq!(restored.binding(), original);
}

#[tokio::test]
async fn restore_failures_run_out() {
    let api = FakePipelineApi::new();
    api.add_pipeline(FakePipeline::new(1, "CI", "payments"));
    api.fail_restore(1, 1);
    let binding = api.pipeline(1).unwrap().binding();

    assert!(api.restore_pipeline(&scope(), 1, &binding).await.is_err());
    assert!(api.restore_pipeline(&scope(), 1, &binding).await.is_ok());
}

#[tokio::test]
async fn lookup_matches_name_or_folder_path() {
    let api = FakePipelineApi::new();
    api.add_pipeline(FakePipeline::new(7, "Deploy", "ops").in_folder("\\Release"));
    assert_eq!(api.get_pipeline_id(&scope(), "deploy").await.unwrap(), 7);
    assert_eq!(api.get_pipeline_id(&scope(), "\\Release\\Deploy").await.unwrap(), 7);
    assert!(matches!(
        api.get_pipeline_id(&scope(), "Nope").await,
        Err(PipelineApiError::PipelineNotFound { .. })
    ));
}

#[tokio::test]
async fn unscripted_builds_succeed_immediately() {
    let api = FakePipelineApi::new();
    api.add_pipeline(FakePipeline::new(1, "CI", "payments"));
    let build_id = api.queue_build(&scope(), 1, "refs/heads/main").await.unwrap();
    let status = api.get_build_status(&scope(), build_id).await.unwrap();
    assert_eq!(status.result.as_deref(), Some("succeeded"));
    assert!(status.url.is_some());
}

#[tokio::test]
async fn scripted_builds_advance() {
    let api = FakePipelineApi::new();
    api.add_pipeline(FakePipeline::new(1, "CI", "payments"));
    api.script_builds(
        1,
        vec![
            BuildStatus {
                status: Some("inProgress".into()),
                ..Default::default()
            },
            BuildStatus {
                status: Some("completed".into()),
                result: Some("failed".into()),
                url: None,
            },
        ],
    );
    let build_id = api.queue_build(&scope(), 1, "refs/heads/main").await.unwrap();
    assert_eq!(api.get_build_status(&scope(), build_id).await.unwrap().result, None);
    assert_eq!(
        api.get_build_status(&scope(), build_id).await.unwrap().result.as_deref(),
        Some("failed")
    );
}

#[tokio::test]
async fn pipelines_are_listed_per_repository() {
    let api = FakePipelineApi::new();
    api.add_pipeline(FakePipeline::new(1, "CI", "payments"));
    api.add_pipeline(FakePipeline::new(2, "Nightly", "payments").in_folder("\\Jobs"));
    api.add_pipeline(FakePipeline::new(3, "CI", "web"));

    let repos = api.get_enabled_repositories(&scope()).await.unwrap();
    assert_eq!(repos.len(), 2);
    let names = api
        .get_pipelines_for_repository(&scope(), "payments-id")
        .await
        .unwrap();
    assert_eq!(names, vec!["\\CI".to_string(), "\\Jobs\\Nightly".to_string()]);
}

#[tokio::test]
async fn in_flight_calls_are_tracked() {
    let api = FakePipelineApi::new();
    api.add_pipeline(FakePipeline::new(1, "CI", "payments"));
    api.set_call_delay(Duration::from_millis(20));

    let scope = scope();
    let (a, b) = tokio::join!(
        api.is_pipeline_enabled(&scope, 1),
        api.is_pipeline_enabled(&scope, 1)
    );
    assert!(a.unwrap() && b.unwrap());
    assert_eq!(api.max_in_flight(), 2);
}

#[tokio::test]
async fn calls_for_filters_by_pipeline() {
    let api = FakePipelineApi::new();
    api.add_pipeline(FakePipeline::new(1, "CI", "payments"));
    api.add_pipeline(FakePipeline::new(2, "CD", "payments"));
    api.is_pipeline_enabled(&scope(), 1).await.unwrap();
    api.is_pipeline_enabled(&scope(), 2).await.unwrap();
    assert_eq!(
        api.calls_for(2),
        vec![PipelineCall::IsPipelineEnabled { pipeline_id: 2 }]
    );
}

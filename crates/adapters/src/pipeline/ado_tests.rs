// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn target() -> GithubTarget {
    GithubTarget::new("acme", "payments", "svc-1")
}

fn definition() -> Value {
    json!({
        "id": 42,
        "name": "CI",
        "path": "\\Services",
        "queueStatus": "enabled",
        "revision": 7,
        "repository": {
            "id": "repo-guid",
            "type": "TfsGit",
            "name": "payments",
            "defaultBranch": "refs/heads/main",
            "clean": "True",
            "checkoutSubmodules": false
        },
        "triggers": [{ "triggerType": "continuousIntegration", "branchFilters": ["+main"] }]
    })
}

#[test]
fn settings_normalize_branch_and_flags() {
    let settings = parse_settings(&definition()).unwrap();
    assert_eq!(settings.default_branch, "main");
    assert_eq!(settings.clean.as_deref(), Some("true"));
    assert_eq!(settings.checkout_submodules.as_deref(), Some("false"));
    assert!(settings.triggers.is_some());
}

#[test]
fn settings_without_triggers_or_flags() {
    let definition = json!({
        "repository": { "name": "payments", "defaultBranch": "develop" },
        "triggers": null
    });
    let settings = parse_settings(&definition).unwrap();
    assert_eq!(settings.default_branch, "develop");
    assert_eq!(settings.clean, None);
    assert_eq!(settings.triggers, None);
}

#[test]
fn repository_section_is_required() {
    let err = parse_repository(&json!({ "id": 1 })).unwrap_err();
    assert!(matches!(err, PipelineApiError::Decode(_)));
}

#[test]
fn parses_pipeline_repository_identity() {
    let repository = parse_repository(&definition()).unwrap();
    assert_eq!(repository.repo_name, "payments");
    assert_eq!(repository.repo_id.as_deref(), Some("repo-guid"));
}

#[test]
fn queue_status_controls_enabled() {
    assert!(queue_status_enabled(&json!({ "queueStatus": "enabled" })));
    assert!(!queue_status_enabled(&json!({ "queueStatus": "disabled" })));
    assert!(!queue_status_enabled(&json!({ "queueStatus": "paused" })));
    assert!(queue_status_enabled(&json!({})));
}

#[test]
fn rewire_swaps_repository_and_keeps_everything_else() {
    let settings = parse_settings(&definition()).unwrap();
    let payload = rewired_definition(definition(), &target(), &settings).unwrap();

    assert_eq!(payload["revision"], 7);
    assert_eq!(payload["repository"]["type"], "GitHub");
    assert_eq!(payload["repository"]["id"], "acme/payments");
    assert_eq!(payload["repository"]["url"], "https://github.com/acme/payments.git");
    assert_eq!(payload["repository"]["properties"]["connectedServiceId"], "svc-1");
    assert_eq!(payload["repository"]["defaultBranch"], "main");
    assert_eq!(payload["repository"]["clean"], "true");
    assert_eq!(payload["triggers"], definition()["triggers"]);
}

#[test]
fn rewire_switches_definition_to_yaml_settings() {
    let settings = parse_settings(&definition()).unwrap();
    let payload = rewired_definition(definition(), &target(), &settings).unwrap();
    assert_eq!(payload["settingsSourceType"], 2);
}

#[test]
fn github_dot_com_urls() {
    let urls = GithubUrls::for_target(&target()).unwrap();
    assert_eq!(urls.api, "https://api.github.com/repos/acme/payments");
    assert_eq!(urls.clone, "https://github.com/acme/payments.git");
    assert_eq!(urls.branches, "https://api.github.com/repos/acme/payments/branches");
    assert_eq!(urls.refs, "https://api.github.com/repos/acme/payments/git/refs");
    assert_eq!(urls.manage, "https://github.com/acme/payments");
}

#[test]
fn enterprise_server_urls_follow_the_api_root() {
    let target = target().with_api_url("https://ghes.contoso.com/api/v3/");
    let urls = GithubUrls::for_target(&target).unwrap();
    assert_eq!(urls.api, "https://ghes.contoso.com/api/v3/repos/acme/payments");
    assert_eq!(urls.clone, "https://ghes.contoso.com/acme/payments.git");
    assert_eq!(urls.branches, "https://ghes.contoso.com/api/v3/repos/acme/payments/branches");
    assert_eq!(urls.refs, "https://ghes.contoso.com/api/v3/repos/acme/payments/git/refs");
    assert_eq!(urls.manage, "https://ghes.contoso.com/acme/payments");
}

#[test]
fn api_subdomain_maps_to_its_web_host() {
    let target = target().with_api_url("https://api.ghe.contoso.com");
    let settings = parse_settings(&definition()).unwrap();
    let payload = rewired_definition(definition(), &target, &settings).unwrap();
    assert_eq!(payload["repository"]["url"], "https://ghe.contoso.com/acme/payments.git");
    assert_eq!(
        payload["repository"]["properties"]["apiUrl"],
        "https://api.ghe.contoso.com/repos/acme/payments"
    );
}

#[test]
fn unparseable_api_root_is_rejected() {
    let target = target().with_api_url("not a url");
    let settings = parse_settings(&definition()).unwrap();
    let err = rewired_definition(definition(), &target, &settings).unwrap_err();
    assert!(matches!(err, PipelineApiError::Http(HttpError::InvalidUrl { .. })));
}

#[test]
fn rewire_without_triggers_leaves_definition_triggers_alone() {
    let mut settings = parse_settings(&definition()).unwrap();
    settings.triggers = None;
    let payload = rewired_definition(definition(), &target(), &settings).unwrap();
    assert_eq!(payload["triggers"], definition()["triggers"]);
}

#[test]
fn restore_reapplies_captured_binding() {
    let binding = PipelineBinding::from_parts(
        parse_repository(&definition()).unwrap(),
        Some(json!([{ "triggerType": "schedule" }])),
    );
    let rewired = rewired_definition(
        definition(),
        &target(),
        &parse_settings(&definition()).unwrap(),
    )
    .unwrap();

    let payload = restored_definition(
        rewired,
        &binding,
        "repo-guid",
        "https://dev.azure.com/contoso/payments/_git/payments",
    )
    .unwrap();

    assert_eq!(payload["repository"]["type"], "TfsGit");
    assert_eq!(payload["repository"]["id"], "repo-guid");
    assert_eq!(payload["repository"]["name"], "payments");
    assert_eq!(payload["repository"]["checkoutSubmodules"], "false");
    assert_eq!(payload["triggers"], json!([{ "triggerType": "schedule" }]));
    assert_eq!(payload["settingsSourceType"], 1);
}

#[test]
fn restore_of_absent_triggers_removes_them() {
    let mut binding = PipelineBinding::from_parts(parse_repository(&definition()).unwrap(), None);
    binding.clean = None;
    let payload = restored_definition(definition(), &binding, "id", "https://x").unwrap();
    assert!(payload.get("triggers").is_none());
    assert_eq!(payload["repository"]["clean"], Value::Null);
}

#[test]
fn build_status_reads_web_link() {
    let status = parse_build_status(&json!({
        "status": "completed",
        "result": "succeeded",
        "_links": { "web": { "href": "https://dev.azure.com/contoso/payments/_build/results?buildId=9" } }
    }));
    assert_eq!(status.result.as_deref(), Some("succeeded"));
    assert!(status.url.unwrap().ends_with("buildId=9"));
    assert_eq!(parse_build_status(&json!({ "status": "inProgress" })).result, None);
}

#[test]
fn definitions_and_repositories_parse_from_listing() {
    let def = parse_definition(&json!({ "id": 3, "name": "CI", "path": "\\" })).unwrap();
    assert_eq!(def.qualified_name(), "\\CI");

    let repo = parse_repository_entry(&json!({ "id": "r1", "name": "api", "isDisabled": "True" })).unwrap();
    assert!(repo.is_disabled);
    let repo = parse_repository_entry(&json!({ "id": "r2", "name": "web" })).unwrap();
    assert!(!repo.is_disabled);
}

#[test]
fn api_urls_encode_scope_segments() {
    let api = AdoPipelineApi::new("https://dev.azure.com/", "pat", Arc::new(InventoryCache::new()));
    let scope = PipelineScope::new("contoso", "Team Payments");
    assert_eq!(
        api.definition_api_url(&scope, 42).unwrap(),
        "https://dev.azure.com/contoso/Team%20Payments/_apis/build/definitions/42?api-version=6.0"
    );
    assert_eq!(
        api.definition_url(&scope, 42),
        "https://dev.azure.com/contoso/Team Payments/_build/definition?definitionId=42"
    );
}

#[tokio::test]
async fn cached_inventory_resolves_without_network() {
    let cache = Arc::new(InventoryCache::new());
    let scope = PipelineScope::new("contoso", "payments");
    cache.store_pipelines(
        &scope,
        PipelineIndex::new(vec![PipelineDefinition {
            id: 11,
            name: "Deploy".into(),
            path: "\\Ops".into(),
        }]),
    );
    cache.store_repositories(
        &scope,
        vec![
            RepositoryEntry { id: "r1".into(), name: "api".into(), is_disabled: false },
            RepositoryEntry { id: "r2".into(), name: "old".into(), is_disabled: true },
        ],
    );
    // Unroutable base URL: any network call would fail the test
    let api = AdoPipelineApi::new("http://127.0.0.1:9", "pat", cache);

    assert_eq!(api.get_pipeline_id(&scope, "\\Ops\\Deploy").await.unwrap(), 11);
    let err = api.get_pipeline_id(&scope, "Missing").await.unwrap_err();
    assert!(matches!(err, PipelineApiError::PipelineNotFound { .. }));

    let enabled = api.get_enabled_repositories(&scope).await.unwrap();
    assert_eq!(enabled, vec![SourceRepository { id: "r1".into(), name: "api".into() }]);
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_repository_migration_node() {
    let body = json!({
        "data": { "node": {
            "id": "RM_1",
            "sourceUrl": "https://dev.azure.com/contoso/payments/_git/api",
            "state": "FAILED",
            "warningsCount": 3,
            "failureReason": "Repository too large",
            "repositoryName": "api",
            "migrationLogUrl": null
        }}
    });
    let migration = parse_repository_migration("RM_1", &body).unwrap();
    assert_eq!(migration.state, RepositoryMigrationState::Failed);
    assert_eq!(migration.repository_name, "api");
    assert_eq!(migration.warnings_count, 3);
    assert_eq!(migration.failure_reason.as_deref(), Some("Repository too large"));
    assert_eq!(migration.migration_log_url, None);
}

#[test]
fn missing_node_is_not_found() {
    let body = json!({ "data": { "node": null } });
    let err = parse_repository_migration("RM_404", &body).unwrap_err();
    assert!(matches!(err, MigrationApiError::NotFound(id) if id == "RM_404"));
}

#[test]
fn node_without_state_is_a_decode_error() {
    let body = json!({ "data": { "node": { "repositoryName": "api" } } });
    let err = parse_repository_migration("RM_1", &body).unwrap_err();
    assert!(matches!(err, MigrationApiError::Decode(_)));
}

#[test]
fn parses_organization_migration_counts() {
    let body = json!({
        "data": { "node": {
            "state": "REPO_MIGRATION",
            "sourceOrgUrl": "https://github.com/source",
            "targetOrgName": "target",
            "failureReason": null,
            "remainingRepositoriesCount": 2,
            "totalRepositoriesCount": 9
        }}
    });
    let migration = parse_organization_migration("OM_1", &body).unwrap();
    assert_eq!(migration.state, OrganizationMigrationState::RepoMigration);
    assert_eq!(migration.repository_progress(), (7, 9));
    assert_eq!(migration.target_org_name, "target");
}

#[test]
fn log_url_distinguishes_missing_and_pending() {
    let none = json!({ "data": { "organization": { "repositoryMigrations": { "nodes": [] } } } });
    assert_eq!(parse_migration_log_url(&none), None);

    let pending = json!({ "data": { "organization": { "repositoryMigrations": {
        "nodes": [{ "id": "RM_1", "migrationLogUrl": null }]
    } } } });
    assert_eq!(parse_migration_log_url(&pending), Some(String::new()));

    let ready = json!({ "data": { "organization": { "repositoryMigrations": {
        "nodes": [{ "id": "RM_1", "migrationLogUrl": "https://logs/1" }]
    } } } });
    assert_eq!(parse_migration_log_url(&ready), Some("https://logs/1".to_string()));
}

#[test]
fn graphql_errors_are_joined() {
    let body = json!({ "errors": [{ "message": "bad id" }, { "message": "denied" }] });
    assert_eq!(graphql_errors(&body).as_deref(), Some("bad id; denied"));
    assert_eq!(graphql_errors(&json!({ "errors": [] })), None);
    assert_eq!(graphql_errors(&json!({ "data": {} })), None);
}

#[test]
fn graphql_url_is_derived_from_api_url() {
    let api = GithubMigrationApi::new("https://api.github.com/", "token");
    assert_eq!(api.graphql_url, "https://api.github.com/graphql");
    assert_eq!(api.source_token(), "token");
    let api = api.with_source_token("source");
    assert_eq!(api.source_token(), "source");
}

#[test]
fn only_http_transient_errors_are_retryable() {
    let transient = MigrationApiError::Http(HttpError::Status {
        status: 502,
        url: "https://api.github.com/graphql".into(),
        body: String::new(),
    });
    assert!(transient.is_transient());
    assert!(!MigrationApiError::GraphQl("bad".into()).is_transient());
    assert!(!MigrationApiError::NotFound("RM_1".into()).is_transient());
}

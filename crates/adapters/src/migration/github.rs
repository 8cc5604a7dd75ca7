// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub GraphQL migration client

use super::{MigrationApi, MigrationApiError};
use crate::http::{HttpClient, HttpError};
use async_trait::async_trait;
use mig_core::{
    OrganizationMigration, OrganizationMigrationRequest, OrganizationMigrationState,
    RepositoryMigration, RepositoryMigrationRequest, RepositoryMigrationState, RetryPolicy,
};
use serde_json::{json, Value};

const REPOSITORY_MIGRATION_QUERY: &str = "query($id: ID!) { node(id: $id) { ... on Migration { id, sourceUrl, state, warningsCount, failureReason, repositoryName, migrationLogUrl } } }";

const ORGANIZATION_MIGRATION_QUERY: &str = "query($id: ID!) { node(id: $id) { ... on OrganizationMigration { state, sourceOrgUrl, targetOrgName, failureReason, remainingRepositoriesCount, totalRepositoriesCount } } }";

const MIGRATION_LOG_QUERY: &str = "query($org: String!, $repo: String!) { organization(login: $org) { repositoryMigrations(last: 1, repositoryName: $repo) { nodes { id, migrationLogUrl } } } }";

const ENTERPRISE_QUERY: &str = "query($slug: String!) { enterprise(slug: $slug) { id } }";

const START_REPOSITORY_MIGRATION: &str = "mutation startRepositoryMigration($sourceId: ID!, $ownerId: ID!, $sourceRepositoryUrl: URI!, $repositoryName: String!, $continueOnError: Boolean!, $accessToken: String!, $githubPat: String!, $skipReleases: Boolean, $targetRepoVisibility: String, $lockSource: Boolean) { startRepositoryMigration(input: { sourceId: $sourceId, ownerId: $ownerId, sourceRepositoryUrl: $sourceRepositoryUrl, repositoryName: $repositoryName, continueOnError: $continueOnError, accessToken: $accessToken, githubPat: $githubPat, skipReleases: $skipReleases, targetRepoVisibility: $targetRepoVisibility, lockSource: $lockSource }) { repositoryMigration { id } } }";

const START_ORGANIZATION_MIGRATION: &str = "mutation startOrganizationMigration($sourceOrgUrl: URI!, $targetOrgName: String!, $targetEnterpriseId: ID!, $sourceAccessToken: String!) { startOrganizationMigration(input: { sourceOrgUrl: $sourceOrgUrl, targetOrgName: $targetOrgName, targetEnterpriseId: $targetEnterpriseId, sourceAccessToken: $sourceAccessToken }) { orgMigration { id } } }";

/// Migration API backed by the GitHub GraphQL endpoint
#[derive(Clone)]
pub struct GithubMigrationApi {
    http: HttpClient,
    downloads: HttpClient,
    graphql_url: String,
    target_token: String,
    source_token: Option<String>,
    retry: RetryPolicy,
}

impl GithubMigrationApi {
    pub fn new(api_url: &str, target_token: &str) -> Self {
        Self {
            http: HttpClient::bearer(target_token),
            downloads: HttpClient::anonymous(),
            graphql_url: format!("{}/graphql", api_url.trim_end_matches('/')),
            target_token: target_token.to_string(),
            source_token: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Token for the source platform, defaults to the target token
    pub fn with_source_token(mut self, token: impl Into<String>) -> Self {
        self.source_token = Some(token.into());
        self
    }

    /// Policy for retrying transient failures of read-only queries
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn source_token(&self) -> &str {
        self.source_token.as_deref().unwrap_or(&self.target_token)
    }

    async fn post(&self, query: &str, variables: Value) -> Result<Value, MigrationApiError> {
        let payload = json!({ "query": query, "variables": variables });
        let response = self.http.post_json(&self.graphql_url, &payload).await?;
        let body: Value = serde_json::from_str(&response.body)
            .map_err(|e| MigrationApiError::Decode(e.to_string()))?;
        if let Some(message) = graphql_errors(&body) {
            return Err(MigrationApiError::GraphQl(message));
        }
        Ok(body)
    }

    /// Read-only query with transient failures retried
    async fn query(&self, query: &str, variables: Value) -> Result<Value, MigrationApiError> {
        self.retry
            .retry(
                || self.post(query, variables.clone()),
                MigrationApiError::is_transient,
            )
            .await
    }

    async fn get_enterprise_id(&self, slug: &str) -> Result<String, MigrationApiError> {
        let body = self.query(ENTERPRISE_QUERY, json!({ "slug": slug })).await?;
        body.pointer("/data/enterprise/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| MigrationApiError::EnterpriseNotFound(slug.to_string()))
    }
}

#[async_trait]
impl MigrationApi for GithubMigrationApi {
    async fn get_repository_migration(
        &self,
        id: &str,
    ) -> Result<RepositoryMigration, MigrationApiError> {
        let body = self
            .query(REPOSITORY_MIGRATION_QUERY, json!({ "id": id }))
            .await?;
        parse_repository_migration(id, &body)
    }

    async fn get_organization_migration(
        &self,
        id: &str,
    ) -> Result<OrganizationMigration, MigrationApiError> {
        let body = self
            .query(ORGANIZATION_MIGRATION_QUERY, json!({ "id": id }))
            .await?;
        parse_organization_migration(id, &body)
    }

    async fn start_repository_migration(
        &self,
        request: &RepositoryMigrationRequest,
    ) -> Result<String, MigrationApiError> {
        let variables = json!({
            "sourceId": request.migration_source_id,
            "ownerId": request.owner_id,
            "sourceRepositoryUrl": request.source_repository_url,
            "repositoryName": request.repository_name,
            "continueOnError": true,
            "accessToken": self.source_token(),
            "githubPat": self.target_token,
            "skipReleases": request.skip_releases,
            "targetRepoVisibility": request.target_repo_visibility,
            "lockSource": request.lock_source,
        });
        let body = self.post(START_REPOSITORY_MIGRATION, variables).await?;
        body.pointer("/data/startRepositoryMigration/repositoryMigration/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| MigrationApiError::Decode("missing repository migration id".into()))
    }

    async fn start_organization_migration(
        &self,
        request: &OrganizationMigrationRequest,
    ) -> Result<String, MigrationApiError> {
        let enterprise_id = self.get_enterprise_id(&request.target_enterprise).await?;
        let variables = json!({
            "sourceOrgUrl": request.source_org_url,
            "targetOrgName": request.target_org_name,
            "targetEnterpriseId": enterprise_id,
            "sourceAccessToken": self.source_token(),
        });
        let body = self.post(START_ORGANIZATION_MIGRATION, variables).await?;
        body.pointer("/data/startOrganizationMigration/orgMigration/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| MigrationApiError::Decode("missing organization migration id".into()))
    }

    async fn get_migration_log_url(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<Option<String>, MigrationApiError> {
        let body = self
            .query(MIGRATION_LOG_QUERY, json!({ "org": org, "repo": repo }))
            .await?;
        Ok(parse_migration_log_url(&body))
    }

    async fn download_log(&self, url: &str) -> Result<String, MigrationApiError> {
        // Log URLs are pre-signed
        let response = self.downloads.get(url).await.map_err(|e| match e {
            HttpError::Status { status: 404, .. } => MigrationApiError::NotFound(url.to_string()),
            other => MigrationApiError::from(other),
        })?;
        Ok(response.body)
    }
}

/// Joined `errors[].message`, if the response carries any
pub(crate) fn graphql_errors(body: &Value) -> Option<String> {
    let errors = body.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    let messages: Vec<&str> = errors
        .iter()
        .filter_map(|e| e.get("message").and_then(Value::as_str))
        .collect();
    Some(messages.join("; "))
}

fn node<'a>(id: &str, body: &'a Value) -> Result<&'a Value, MigrationApiError> {
    match body.pointer("/data/node") {
        Some(node) if node.is_object() => Ok(node),
        _ => Err(MigrationApiError::NotFound(id.to_string())),
    }
}

fn str_field(node: &Value, field: &str) -> Option<String> {
    node.get(field).and_then(Value::as_str).map(str::to_string)
}

fn count_field(node: &Value, field: &str) -> Option<u32> {
    node.get(field)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

pub(crate) fn parse_repository_migration(
    id: &str,
    body: &Value,
) -> Result<RepositoryMigration, MigrationApiError> {
    let node = node(id, body)?;
    let state = str_field(node, "state")
        .ok_or_else(|| MigrationApiError::Decode(format!("migration {} has no state", id)))?;
    Ok(RepositoryMigration {
        id: id.to_string(),
        state: RepositoryMigrationState::parse(&state),
        repository_name: str_field(node, "repositoryName").unwrap_or_default(),
        source_url: str_field(node, "sourceUrl"),
        warnings_count: count_field(node, "warningsCount").unwrap_or(0),
        failure_reason: str_field(node, "failureReason"),
        migration_log_url: str_field(node, "migrationLogUrl"),
    })
}

pub(crate) fn parse_organization_migration(
    id: &str,
    body: &Value,
) -> Result<OrganizationMigration, MigrationApiError> {
    let node = node(id, body)?;
    let state = str_field(node, "state")
        .ok_or_else(|| MigrationApiError::Decode(format!("migration {} has no state", id)))?;
    Ok(OrganizationMigration {
        id: id.to_string(),
        state: OrganizationMigrationState::parse(&state),
        source_org_url: str_field(node, "sourceOrgUrl").unwrap_or_default(),
        target_org_name: str_field(node, "targetOrgName").unwrap_or_default(),
        failure_reason: str_field(node, "failureReason"),
        remaining_repositories_count: count_field(node, "remainingRepositoriesCount"),
        total_repositories_count: count_field(node, "totalRepositoriesCount"),
    })
}

pub(crate) fn parse_migration_log_url(body: &Value) -> Option<String> {
    let nodes = body
        .pointer("/data/organization/repositoryMigrations/nodes")?
        .as_array()?;
    let latest = nodes.first()?;
    Some(str_field(latest, "migrationLogUrl").unwrap_or_default())
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Azure DevOps REST pipeline client

use super::{PipelineApi, PipelineApiError};
use crate::cache::{InventoryCache, RepositoryEntry};
use crate::http::{join_segments, with_query, HttpClient, HttpError};
use async_trait::async_trait;
use mig_core::pipeline::normalize_branch;
use mig_core::{
    BuildStatus, GithubTarget, PipelineBinding, PipelineDefinition, PipelineIndex,
    PipelineRepository, PipelineScope, PipelineSettings, SourceRepository,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const API_VERSION: &str = "6.0";
const REPOSITORIES_API_VERSION: &str = "6.1-preview.1";

/// Pipeline API backed by the Azure DevOps REST endpoints
#[derive(Clone)]
pub struct AdoPipelineApi {
    http: HttpClient,
    base_url: String,
    cache: Arc<InventoryCache>,
}

impl AdoPipelineApi {
    pub fn new(base_url: &str, pat: &str, cache: Arc<InventoryCache>) -> Self {
        Self {
            http: HttpClient::basic_pat(pat),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    fn api_url(
        &self,
        scope: &PipelineScope,
        path: &[&str],
        api_version: &str,
    ) -> Result<String, HttpError> {
        let mut segments = vec![scope.org.as_str(), scope.project.as_str(), "_apis"];
        segments.extend_from_slice(path);
        let url = join_segments(&self.base_url, &segments)?;
        with_query(&url, "api-version", api_version)
    }

    fn definition_api_url(&self, scope: &PipelineScope, pipeline_id: u64) -> Result<String, HttpError> {
        let id = pipeline_id.to_string();
        self.api_url(scope, &["build", "definitions", &id], API_VERSION)
    }

    async fn get_json(&self, url: &str) -> Result<Value, PipelineApiError> {
        let response = self.http.get(url).await?;
        parse_json(&response.body)
    }

    async fn fetch_definition(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<Value, PipelineApiError> {
        let url = self.definition_api_url(scope, pipeline_id)?;
        match self.get_json(&url).await {
            Err(PipelineApiError::Http(HttpError::Status { status: 404, .. })) => {
                Err(PipelineApiError::PipelineNotFound {
                    scope: scope.to_string(),
                    pipeline: pipeline_id.to_string(),
                })
            }
            other => other,
        }
    }

    async fn put_definition(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        definition: &Value,
    ) -> Result<(), PipelineApiError> {
        let url = self.definition_api_url(scope, pipeline_id)?;
        self.http.put_json(&url, definition).await?;
        Ok(())
    }

    async fn pipeline_index(
        &self,
        scope: &PipelineScope,
    ) -> Result<Arc<PipelineIndex>, PipelineApiError> {
        if let Some(index) = self.cache.pipelines(scope) {
            return Ok(index);
        }
        let url = self.api_url(scope, &["build", "definitions"], API_VERSION)?;
        let url = with_query(&url, "queryOrder", "definitionNameAscending")?;
        let items = self.http.get_all_pages(&url).await?;
        let definitions = items
            .iter()
            .map(parse_definition)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(scope = %scope, count = definitions.len(), "cached pipeline inventory");
        Ok(self.cache.store_pipelines(scope, PipelineIndex::new(definitions)))
    }

    async fn repositories(
        &self,
        scope: &PipelineScope,
    ) -> Result<Arc<Vec<RepositoryEntry>>, PipelineApiError> {
        if let Some(repositories) = self.cache.repositories(scope) {
            return Ok(repositories);
        }
        let url = self.api_url(scope, &["git", "repositories"], REPOSITORIES_API_VERSION)?;
        let items = self.http.get_all_pages(&url).await?;
        let repositories = items
            .iter()
            .map(parse_repository_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.cache.store_repositories(scope, repositories))
    }

    async fn repository_id(
        &self,
        scope: &PipelineScope,
        repo_name: &str,
    ) -> Result<String, PipelineApiError> {
        self.repositories(scope).await?;
        self.cache
            .repository_id(scope, repo_name)
            .ok_or_else(|| PipelineApiError::RepositoryNotFound {
                scope: scope.to_string(),
                repo: repo_name.to_string(),
            })
    }

    fn git_url(&self, scope: &PipelineScope, repo_name: &str) -> Result<String, HttpError> {
        join_segments(
            &self.base_url,
            &[scope.org.as_str(), scope.project.as_str(), "_git", repo_name],
        )
    }
}

#[async_trait]
impl PipelineApi for AdoPipelineApi {
    fn definition_url(&self, scope: &PipelineScope, pipeline_id: u64) -> String {
        scope.definition_url(&self.base_url, pipeline_id)
    }

    async fn get_pipeline_id(
        &self,
        scope: &PipelineScope,
        pipeline: &str,
    ) -> Result<u64, PipelineApiError> {
        let index = self.pipeline_index(scope).await?;
        index
            .resolve(pipeline)
            .ok_or_else(|| PipelineApiError::PipelineNotFound {
                scope: scope.to_string(),
                pipeline: pipeline.to_string(),
            })
    }

    async fn is_pipeline_enabled(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<bool, PipelineApiError> {
        let definition = self.fetch_definition(scope, pipeline_id).await?;
        Ok(queue_status_enabled(&definition))
    }

    async fn get_pipeline(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<PipelineSettings, PipelineApiError> {
        let definition = self.fetch_definition(scope, pipeline_id).await?;
        parse_settings(&definition)
    }

    async fn get_pipeline_repository(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<PipelineRepository, PipelineApiError> {
        let definition = self.fetch_definition(scope, pipeline_id).await?;
        parse_repository(&definition)
    }

    async fn rewire_pipeline(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        target: &GithubTarget,
        settings: &PipelineSettings,
    ) -> Result<(), PipelineApiError> {
        let definition = self.fetch_definition(scope, pipeline_id).await?;
        let payload = rewired_definition(definition, target, settings)?;
        self.put_definition(scope, pipeline_id, &payload).await
    }

    async fn restore_pipeline(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        binding: &PipelineBinding,
    ) -> Result<(), PipelineApiError> {
        let definition = self.fetch_definition(scope, pipeline_id).await?;
        let repo_id = match &binding.repo_id {
            Some(id) => id.clone(),
            None => self.repository_id(scope, &binding.repo_name).await?,
        };
        let repo_url = self.git_url(scope, &binding.repo_name)?;
        let payload = restored_definition(definition, binding, &repo_id, &repo_url)?;
        self.put_definition(scope, pipeline_id, &payload).await
    }

    async fn queue_build(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        source_branch: &str,
    ) -> Result<u64, PipelineApiError> {
        let url = self.api_url(scope, &["build", "builds"], API_VERSION)?;
        let payload = json!({
            "definition": { "id": pipeline_id },
            "sourceBranch": source_branch,
            "reason": "manual",
        });
        let response = self.http.post_json(&url, &payload).await?;
        let body = parse_json(&response.body)?;
        body.get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| PipelineApiError::Decode("queued build has no id".into()))
    }

    async fn get_build_status(
        &self,
        scope: &PipelineScope,
        build_id: u64,
    ) -> Result<BuildStatus, PipelineApiError> {
        let id = build_id.to_string();
        let url = self.api_url(scope, &["build", "builds", &id], API_VERSION)?;
        let body = self.get_json(&url).await?;
        Ok(parse_build_status(&body))
    }

    async fn get_enabled_repositories(
        &self,
        scope: &PipelineScope,
    ) -> Result<Vec<SourceRepository>, PipelineApiError> {
        let repositories = self.repositories(scope).await?;
        Ok(repositories
            .iter()
            .filter(|r| !r.is_disabled)
            .map(RepositoryEntry::to_source_repository)
            .collect())
    }

    async fn get_pipelines_for_repository(
        &self,
        scope: &PipelineScope,
        repo_id: &str,
    ) -> Result<Vec<String>, PipelineApiError> {
        let url = self.api_url(scope, &["build", "definitions"], API_VERSION)?;
        let url = with_query(&url, "repositoryId", repo_id)?;
        let url = with_query(&url, "repositoryType", "TfsGit")?;
        let items = self.http.get_all_pages(&url).await?;
        items
            .iter()
            .map(|item| parse_definition(item).map(|d| d.qualified_name()))
            .collect()
    }
}

fn parse_json(body: &str) -> Result<Value, PipelineApiError> {
    serde_json::from_str(body).map_err(|e| PipelineApiError::Decode(e.to_string()))
}

fn str_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Flags come back as strings or booleans depending on the definition's age
fn flag_field(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::String(s) => Some(s.to_lowercase()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn flag_value(flag: &Option<String>) -> Value {
    match flag {
        Some(f) => Value::String(f.clone()),
        None => Value::Null,
    }
}

fn repository_section(definition: &Value) -> Result<&Value, PipelineApiError> {
    definition
        .get("repository")
        .filter(|r| r.is_object())
        .ok_or_else(|| PipelineApiError::Decode("definition has no repository".into()))
}

pub(crate) fn parse_definition(item: &Value) -> Result<PipelineDefinition, PipelineApiError> {
    let id = item
        .get("id")
        .and_then(Value::as_u64)
        .ok_or_else(|| PipelineApiError::Decode("definition has no id".into()))?;
    Ok(PipelineDefinition {
        id,
        name: str_field(item, "name").unwrap_or_default(),
        path: str_field(item, "path").unwrap_or_else(|| "\\".to_string()),
    })
}

pub(crate) fn parse_repository_entry(item: &Value) -> Result<RepositoryEntry, PipelineApiError> {
    let id = str_field(item, "id")
        .ok_or_else(|| PipelineApiError::Decode("repository has no id".into()))?;
    let is_disabled = match item.get("isDisabled") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    };
    Ok(RepositoryEntry {
        id,
        name: str_field(item, "name").unwrap_or_default(),
        is_disabled,
    })
}

pub(crate) fn queue_status_enabled(definition: &Value) -> bool {
    match definition.get("queueStatus").and_then(Value::as_str) {
        Some(status) => status.eq_ignore_ascii_case("enabled"),
        None => true,
    }
}

pub(crate) fn parse_settings(definition: &Value) -> Result<PipelineSettings, PipelineApiError> {
    let repository = repository_section(definition)?;
    Ok(PipelineSettings {
        default_branch: normalize_branch(&str_field(repository, "defaultBranch").unwrap_or_default()),
        clean: flag_field(repository, "clean"),
        checkout_submodules: flag_field(repository, "checkoutSubmodules"),
        triggers: definition.get("triggers").filter(|t| !t.is_null()).cloned(),
    })
}

pub(crate) fn parse_repository(definition: &Value) -> Result<PipelineRepository, PipelineApiError> {
    let repository = repository_section(definition)?;
    Ok(PipelineRepository {
        repo_name: str_field(repository, "name").unwrap_or_default(),
        repo_id: str_field(repository, "id"),
        default_branch: normalize_branch(&str_field(repository, "defaultBranch").unwrap_or_default()),
        clean: flag_field(repository, "clean"),
        checkout_submodules: flag_field(repository, "checkoutSubmodules"),
    })
}

pub(crate) fn parse_build_status(body: &Value) -> BuildStatus {
    BuildStatus {
        status: str_field(body, "status"),
        result: str_field(body, "result"),
        url: body
            .pointer("/_links/web/href")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn into_object(definition: Value) -> Result<Map<String, Value>, PipelineApiError> {
    match definition {
        Value::Object(map) => Ok(map),
        _ => Err(PipelineApiError::Decode("definition is not an object".into())),
    }
}

/// Endpoints of a GitHub repository, derived from the target's API root
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GithubUrls {
    pub api: String,
    pub clone: String,
    pub branches: String,
    pub refs: String,
    pub manage: String,
}

impl GithubUrls {
    /// `https://api.example.com` serves `https://example.com`; any other host
    /// (GitHub Enterprise Server's `/api/v3`) serves the web UI on itself.
    pub(crate) fn for_target(target: &GithubTarget) -> Result<Self, HttpError> {
        let api_root = target.api_url.trim_end_matches('/');
        let parsed = url::Url::parse(api_root).map_err(|e| HttpError::InvalidUrl {
            url: api_root.to_string(),
            message: e.to_string(),
        })?;
        let host = parsed.host_str().unwrap_or_default();
        let web_host = host.strip_prefix("api.").unwrap_or(host);
        let web_root = match parsed.port() {
            Some(port) => format!("{}://{}:{}", parsed.scheme(), web_host, port),
            None => format!("{}://{}", parsed.scheme(), web_host),
        };

        let (org, repo) = (target.org.as_str(), target.repo.as_str());
        let clone_name = format!("{}.git", repo);
        Ok(Self {
            api: join_segments(api_root, &["repos", org, repo])?,
            clone: join_segments(&web_root, &[org, &clone_name])?,
            branches: join_segments(api_root, &["repos", org, repo, "branches"])?,
            refs: join_segments(api_root, &["repos", org, repo, "git", "refs"])?,
            manage: join_segments(&web_root, &[org, repo])?,
        })
    }
}

/// Repository section pointing a definition at GitHub
pub(crate) fn github_repository(
    target: &GithubTarget,
    settings: &PipelineSettings,
) -> Result<Value, HttpError> {
    let full_name = format!("{}/{}", target.org, target.repo);
    let urls = GithubUrls::for_target(target)?;
    Ok(json!({
        "properties": {
            "apiUrl": urls.api,
            "branchesUrl": urls.branches,
            "cloneUrl": urls.clone,
            "connectedServiceId": target.service_connection_id,
            "defaultBranch": settings.default_branch,
            "fullName": full_name,
            "manageUrl": urls.manage,
            "orgName": target.org,
            "refsUrl": urls.refs,
            "safeRepository": full_name,
            "shortName": target.repo,
            "reportBuildStatus": "true",
        },
        "id": full_name,
        "type": "GitHub",
        "name": full_name,
        "url": urls.clone,
        "defaultBranch": settings.default_branch,
        "clean": flag_value(&settings.clean),
        "checkoutSubmodules": flag_value(&settings.checkout_submodules),
    }))
}

/// Definition with its repository swapped for GitHub; triggers carried over
pub(crate) fn rewired_definition(
    definition: Value,
    target: &GithubTarget,
    settings: &PipelineSettings,
) -> Result<Value, PipelineApiError> {
    let mut payload = into_object(definition)?;
    payload.insert("repository".into(), github_repository(target, settings)?);
    if let Some(triggers) = &settings.triggers {
        payload.insert("triggers".into(), triggers.clone());
    }
    // 2 = build from the YAML file in the GitHub repository
    payload.insert("settingsSourceType".into(), json!(2));
    Ok(Value::Object(payload))
}

/// Definition with the captured Azure Repos binding re-applied
pub(crate) fn restored_definition(
    definition: Value,
    binding: &PipelineBinding,
    repo_id: &str,
    repo_url: &str,
) -> Result<Value, PipelineApiError> {
    let mut payload = into_object(definition)?;
    payload.insert(
        "repository".into(),
        json!({
            "id": repo_id,
            "type": "TfsGit",
            "name": binding.repo_name,
            "url": repo_url,
            "defaultBranch": binding.default_branch,
            "clean": flag_value(&binding.clean),
            "checkoutSubmodules": flag_value(&binding.checkout_submodules),
            "properties": {
                "cleanOptions": "0",
                "labelSources": "0",
                "labelSourcesFormat": "$(build.buildNumber)",
                "reportBuildStatus": "true",
                "gitLfsSupport": "false",
                "skipSyncSource": "false",
                "checkoutNestedSubmodules": "false",
                "fetchDepth": "0",
            },
        }),
    );
    match &binding.triggers {
        Some(triggers) => {
            payload.insert("triggers".into(), triggers.clone());
        }
        None => {
            payload.remove("triggers");
        }
    }
    // 1 = settings come from the UI rather than YAML
    payload.insert("settingsSourceType".into(), json!(1));
    Ok(Value::Object(payload))
}

#[cfg(test)]
#[path = "ado_tests.rs"]
mod tests;

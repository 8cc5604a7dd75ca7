// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline identity and source-control binding

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Organization and team project a pipeline lives in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineScope {
    pub org: String,
    pub project: String,
}

impl PipelineScope {
    pub fn new(org: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            project: project.into(),
        }
    }

    /// Browser URL of a build definition
    pub fn definition_url(&self, base_url: &str, pipeline_id: u64) -> String {
        format!(
            "{}/{}/{}/_build/definition?definitionId={}",
            base_url.trim_end_matches('/'),
            self.org,
            self.project,
            pipeline_id
        )
    }
}

impl fmt::Display for PipelineScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.project)
    }
}

/// Caller misuse of [`PipelineSelector::from_options`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("cannot specify both a pipeline name and a pipeline id")]
    Both,
    #[error("either a pipeline name or a pipeline id must be specified")]
    Neither,
}

/// How the caller identifies a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PipelineSelector {
    Name(String),
    Id(u64),
}

impl PipelineSelector {
    /// Build a selector from two optional inputs, exactly one of which must be set
    pub fn from_options(name: Option<String>, id: Option<u64>) -> Result<Self, SelectorError> {
        let name = name.filter(|n| !n.trim().is_empty());
        match (name, id) {
            (Some(_), Some(_)) => Err(SelectorError::Both),
            (None, None) => Err(SelectorError::Neither),
            (Some(name), None) => Ok(PipelineSelector::Name(name)),
            (None, Some(id)) => Ok(PipelineSelector::Id(id)),
        }
    }
}

impl fmt::Display for PipelineSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineSelector::Name(name) => f.write_str(name),
            PipelineSelector::Id(id) => write!(f, "#{}", id),
        }
    }
}

/// API root of github.com
pub const GITHUB_API_URL: &str = "https://api.github.com";

fn default_github_api_url() -> String {
    GITHUB_API_URL.to_string()
}

/// GitHub repository a pipeline gets rewired to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubTarget {
    pub org: String,
    pub repo: String,
    /// Azure DevOps service connection that authenticates against GitHub
    pub service_connection_id: String,
    /// API root; differs from github.com for GitHub Enterprise Server
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
}

impl GithubTarget {
    /// Target on github.com
    pub fn new(
        org: impl Into<String>,
        repo: impl Into<String>,
        service_connection_id: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            service_connection_id: service_connection_id.into(),
            api_url: default_github_api_url(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// Repository section of a build definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRepository {
    pub repo_name: String,
    pub repo_id: Option<String>,
    pub default_branch: String,
    /// Raw flag value as stored on the definition, `None` when unset
    pub clean: Option<String>,
    pub checkout_submodules: Option<String>,
}

/// Rewire-relevant settings of a build definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub default_branch: String,
    pub clean: Option<String>,
    pub checkout_submodules: Option<String>,
    /// Opaque trigger configuration, `None` when the definition has none
    pub triggers: Option<serde_json::Value>,
}

/// Snapshot of the part of a pipeline that rewiring changes
///
/// Captured before any mutation and re-applied verbatim on restore. Trigger
/// configuration is carried as-is and never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineBinding {
    pub repo_name: String,
    pub repo_id: Option<String>,
    pub default_branch: String,
    pub clean: Option<String>,
    pub checkout_submodules: Option<String>,
    pub triggers: Option<serde_json::Value>,
}

impl PipelineBinding {
    pub fn from_parts(repository: PipelineRepository, triggers: Option<serde_json::Value>) -> Self {
        Self {
            repo_name: repository.repo_name,
            repo_id: repository.repo_id,
            default_branch: repository.default_branch,
            clean: repository.clean,
            checkout_submodules: repository.checkout_submodules,
            triggers,
        }
    }

    /// Settings to carry over when pointing the pipeline somewhere else
    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            default_branch: self.default_branch.clone(),
            clean: self.clean.clone(),
            checkout_submodules: self.checkout_submodules.clone(),
            triggers: self.triggers.clone(),
        }
    }

    /// Fully-qualified ref of the default branch
    pub fn branch_ref(&self) -> String {
        branch_ref(&self.default_branch)
    }
}

/// Last observed state of a queued build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatus {
    pub status: Option<String>,
    pub result: Option<String>,
    pub url: Option<String>,
}

impl BuildStatus {
    /// A build is finished once it reports any result
    pub fn is_finished(&self) -> bool {
        self.result.as_deref().is_some_and(|r| !r.is_empty())
    }
}

/// A build definition as listed by the pipeline inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub id: u64,
    pub name: String,
    /// Folder path, `\` for the root folder
    pub path: String,
}

impl PipelineDefinition {
    /// Display name including the folder, e.g. `\Services\CI`
    pub fn qualified_name(&self) -> String {
        definition_path(&self.path, &self.name)
    }
}

/// An enabled source repository within a team project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRepository {
    pub id: String,
    pub name: String,
}

/// Strip a leading `refs/heads/` from a branch name
pub fn normalize_branch(branch: &str) -> String {
    branch
        .strip_prefix(BRANCH_REF_PREFIX)
        .unwrap_or(branch)
        .to_string()
}

/// Qualify a branch name as `refs/heads/{branch}`
pub fn branch_ref(branch: &str) -> String {
    format!("{}{}", BRANCH_REF_PREFIX, normalize_branch(branch))
}

/// Canonical `\folder\name` form of a user-supplied pipeline path
pub fn normalize_pipeline_path(pipeline: &str) -> String {
    let parts: Vec<&str> = pipeline.split(['\\', '/']).filter(|p| !p.is_empty()).collect();
    format!("\\{}", parts.join("\\"))
}

/// Canonical `\folder\name` form of a definition's folder and name
pub fn definition_path(path: &str, name: &str) -> String {
    let parts: Vec<&str> = path.split('\\').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        format!("\\{}", name)
    } else {
        format!("\\{}\\{}", parts.join("\\"), name)
    }
}

/// Case-insensitive index from pipeline path to definition id
#[derive(Debug, Clone, Default)]
pub struct PipelineIndex {
    by_path: HashMap<String, u64>,
    definitions: Vec<PipelineDefinition>,
}

impl PipelineIndex {
    pub fn new(definitions: Vec<PipelineDefinition>) -> Self {
        let mut by_path = HashMap::new();
        for def in &definitions {
            let key = def.qualified_name().to_uppercase();
            if by_path.contains_key(&key) {
                tracing::warn!(
                    pipeline = %def.qualified_name(),
                    ignored_id = def.id,
                    "multiple pipelines with the same path/name, ignoring duplicate"
                );
                continue;
            }
            by_path.insert(key, def.id);
        }
        Self {
            by_path,
            definitions,
        }
    }

    /// Resolve a pipeline by path, falling back to a unique bare name
    pub fn resolve(&self, pipeline: &str) -> Option<u64> {
        let key = normalize_pipeline_path(pipeline).to_uppercase();
        if let Some(id) = self.by_path.get(&key) {
            return Some(*id);
        }

        let wanted = pipeline.to_uppercase();
        let mut matches = self
            .definitions
            .iter()
            .filter(|d| d.name.to_uppercase() == wanted);
        match (matches.next(), matches.next()) {
            (Some(def), None) => Some(def.id),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

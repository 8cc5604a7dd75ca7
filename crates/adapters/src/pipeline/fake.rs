// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake pipeline API for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{PipelineApi, PipelineApiError};
use async_trait::async_trait;
use mig_core::pipeline::{definition_path, normalize_pipeline_path};
use mig_core::{
    BuildStatus, GithubTarget, PipelineBinding, PipelineRepository, PipelineScope,
    PipelineSettings, SourceRepository,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded pipeline call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineCall {
    GetPipelineId { pipeline: String },
    IsPipelineEnabled { pipeline_id: u64 },
    GetPipeline { pipeline_id: u64 },
    GetPipelineRepository { pipeline_id: u64 },
    Rewire { pipeline_id: u64, target_repo: String },
    Restore { pipeline_id: u64, repo_name: String },
    QueueBuild { pipeline_id: u64, source_branch: String },
    GetBuildStatus { build_id: u64 },
    GetEnabledRepositories,
    GetPipelinesForRepository { repo_id: String },
}

impl PipelineCall {
    pub fn pipeline_id(&self) -> Option<u64> {
        match self {
            PipelineCall::IsPipelineEnabled { pipeline_id }
            | PipelineCall::GetPipeline { pipeline_id }
            | PipelineCall::GetPipelineRepository { pipeline_id }
            | PipelineCall::Rewire { pipeline_id, .. }
            | PipelineCall::Restore { pipeline_id, .. }
            | PipelineCall::QueueBuild { pipeline_id, .. } => Some(*pipeline_id),
            _ => None,
        }
    }
}

/// Fake pipeline state
#[derive(Debug, Clone, PartialEq)]
pub struct FakePipeline {
    pub id: u64,
    pub name: String,
    /// Folder path, `\` for the root
    pub path: String,
    pub enabled: bool,
    pub repository: PipelineRepository,
    pub triggers: Option<serde_json::Value>,
    /// Set while the pipeline points at GitHub
    pub github: Option<GithubTarget>,
}

impl FakePipeline {
    pub fn new(id: u64, name: &str, repo_name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            path: "\\".to_string(),
            enabled: true,
            repository: PipelineRepository {
                repo_name: repo_name.to_string(),
                repo_id: Some(format!("{}-id", repo_name)),
                default_branch: "main".to_string(),
                clean: Some("true".to_string()),
                checkout_submodules: Some("false".to_string()),
            },
            triggers: None,
            github: None,
        }
    }

    pub fn with_triggers(mut self, triggers: serde_json::Value) -> Self {
        self.triggers = Some(triggers);
        self
    }

    pub fn in_folder(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn qualified_name(&self) -> String {
        definition_path(&self.path, &self.name)
    }

    /// Binding as it would be captured right now
    pub fn binding(&self) -> PipelineBinding {
        PipelineBinding::from_parts(self.repository.clone(), self.triggers.clone())
    }
}

#[derive(Default)]
struct FakeState {
    pipelines: HashMap<u64, FakePipeline>,
    repositories: Vec<SourceRepository>,
    builds: HashMap<u64, u64>,
    build_scripts: HashMap<u64, VecDeque<BuildStatus>>,
    /// Remaining injected failures per operation key; `usize::MAX` never runs out
    failures: HashMap<String, usize>,
    next_build_id: u64,
    calls: Vec<PipelineCall>,
}

/// Fake pipeline API with failure injection and concurrency instrumentation
#[derive(Clone, Default)]
pub struct FakePipelineApi {
    state: Arc<Mutex<FakeState>>,
    call_delay: Arc<Mutex<Duration>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakePipelineApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<PipelineCall> {
        self.lock().calls.clone()
    }

    /// Recorded calls touching one pipeline
    pub fn calls_for(&self, pipeline_id: u64) -> Vec<PipelineCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.pipeline_id() == Some(pipeline_id))
            .collect()
    }

    /// Register a pipeline; its repository becomes an enabled repository
    pub fn add_pipeline(&self, pipeline: FakePipeline) {
        let mut state = self.lock();
        let repo = SourceRepository {
            id: pipeline
                .repository
                .repo_id
                .clone()
                .unwrap_or_else(|| pipeline.repository.repo_name.clone()),
            name: pipeline.repository.repo_name.clone(),
        };
        if !state.repositories.contains(&repo) {
            state.repositories.push(repo);
        }
        state.pipelines.insert(pipeline.id, pipeline);
    }

    /// Current state of a pipeline
    pub fn pipeline(&self, pipeline_id: u64) -> Option<FakePipeline> {
        self.lock().pipelines.get(&pipeline_id).cloned()
    }

    /// Script the statuses returned for builds of a pipeline; the last repeats
    pub fn script_builds(&self, pipeline_id: u64, statuses: Vec<BuildStatus>) {
        self.lock().build_scripts.insert(pipeline_id, statuses.into());
    }

    /// Delay every call, so concurrent callers overlap
    pub fn set_call_delay(&self, delay: Duration) {
        *self.call_delay.lock().unwrap_or_else(|e| e.into_inner()) = delay;
    }

    /// Highest number of calls observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn fail_rewire(&self, pipeline_id: u64) {
        self.inject(format!("rewire:{}", pipeline_id), usize::MAX);
    }

    /// Fail the next `times` restores of a pipeline
    pub fn fail_restore(&self, pipeline_id: u64, times: usize) {
        self.inject(format!("restore:{}", pipeline_id), times);
    }

    pub fn fail_queue_build(&self, pipeline_id: u64) {
        self.inject(format!("queue:{}", pipeline_id), usize::MAX);
    }

    /// Fail every status query for a build; builds are numbered from 1001
    pub fn fail_build_status(&self, build_id: u64) {
        self.inject(format!("status:{}", build_id), usize::MAX);
    }

    pub fn fail_capture(&self, pipeline_id: u64) {
        self.inject(format!("capture:{}", pipeline_id), usize::MAX);
    }

    pub fn fail_pipeline_id(&self, pipeline: &str) {
        self.inject(format!("lookup:{}", pipeline.to_uppercase()), usize::MAX);
    }

    pub fn fail_pipelines_for_repository(&self, repo_id: &str) {
        self.inject(format!("listing:{}", repo_id), usize::MAX);
    }

    pub fn fail_enabled_repositories(&self) {
        self.inject("repositories".to_string(), usize::MAX);
    }

    fn inject(&self, key: String, times: usize) {
        self.lock().failures.insert(key, times);
    }

    async fn enter(&self, call: PipelineCall, failure_key: Option<String>) -> Result<InFlight, PipelineApiError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(Arc::clone(&self.in_flight));

        let delay = *self.call_delay.lock().unwrap_or_else(|e| e.into_inner());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        state.calls.push(call);
        if let Some(key) = failure_key {
            if let Some(remaining) = state.failures.get_mut(&key) {
                if *remaining > 0 {
                    if *remaining != usize::MAX {
                        *remaining -= 1;
                    }
                    return Err(PipelineApiError::Rejected(format!("injected failure: {}", key)));
                }
            }
        }
        Ok(guard)
    }

    fn not_found(scope: &PipelineScope, pipeline: impl ToString) -> PipelineApiError {
        PipelineApiError::PipelineNotFound {
            scope: scope.to_string(),
            pipeline: pipeline.to_string(),
        }
    }

    fn existing(&self, scope: &PipelineScope, pipeline_id: u64) -> Result<FakePipeline, PipelineApiError> {
        self.pipeline(pipeline_id)
            .ok_or_else(|| Self::not_found(scope, pipeline_id))
    }
}

#[async_trait]
impl PipelineApi for FakePipelineApi {
    fn definition_url(&self, scope: &PipelineScope, pipeline_id: u64) -> String {
        scope.definition_url("https://dev.azure.com", pipeline_id)
    }

    async fn get_pipeline_id(
        &self,
        scope: &PipelineScope,
        pipeline: &str,
    ) -> Result<u64, PipelineApiError> {
        let _active = self
            .enter(
                PipelineCall::GetPipelineId {
                    pipeline: pipeline.to_string(),
                },
                Some(format!("lookup:{}", pipeline.to_uppercase())),
            )
            .await?;
        let wanted = normalize_pipeline_path(pipeline).to_uppercase();
        let state = self.lock();
        state
            .pipelines
            .values()
            .find(|p| {
                p.qualified_name().to_uppercase() == wanted
                    || p.name.eq_ignore_ascii_case(pipeline)
            })
            .map(|p| p.id)
            .ok_or_else(|| Self::not_found(scope, pipeline))
    }

    async fn is_pipeline_enabled(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<bool, PipelineApiError> {
        let _active = self
            .enter(PipelineCall::IsPipelineEnabled { pipeline_id }, None)
            .await?;
        Ok(self.existing(scope, pipeline_id)?.enabled)
    }

    async fn get_pipeline(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<PipelineSettings, PipelineApiError> {
        let _active = self
            .enter(
                PipelineCall::GetPipeline { pipeline_id },
                Some(format!("capture:{}", pipeline_id)),
            )
            .await?;
        Ok(self.existing(scope, pipeline_id)?.binding().settings())
    }

    async fn get_pipeline_repository(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<PipelineRepository, PipelineApiError> {
        let _active = self
            .enter(
                PipelineCall::GetPipelineRepository { pipeline_id },
                Some(format!("capture:{}", pipeline_id)),
            )
            .await?;
        Ok(self.existing(scope, pipeline_id)?.repository)
    }

    async fn rewire_pipeline(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        target: &GithubTarget,
        settings: &PipelineSettings,
    ) -> Result<(), PipelineApiError> {
        let _active = self
            .enter(
                PipelineCall::Rewire {
                    pipeline_id,
                    target_repo: format!("{}/{}", target.org, target.repo),
                },
                Some(format!("rewire:{}", pipeline_id)),
            )
            .await?;
        let mut state = self.lock();
        let pipeline = state
            .pipelines
            .get_mut(&pipeline_id)
            .ok_or_else(|| Self::not_found(scope, pipeline_id))?;
        pipeline.github = Some(target.clone());
        if settings.triggers.is_some() {
            pipeline.triggers = settings.triggers.clone();
        }
        Ok(())
    }

    async fn restore_pipeline(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        binding: &PipelineBinding,
    ) -> Result<(), PipelineApiError> {
        let _active = self
            .enter(
                PipelineCall::Restore {
                    pipeline_id,
                    repo_name: binding.repo_name.clone(),
                },
                Some(format!("restore:{}", pipeline_id)),
            )
            .await?;
        let mut state = self.lock();
        let pipeline = state
            .pipelines
            .get_mut(&pipeline_id)
            .ok_or_else(|| Self::not_found(scope, pipeline_id))?;
        pipeline.github = None;
        pipeline.repository = PipelineRepository {
            repo_name: binding.repo_name.clone(),
            repo_id: binding.repo_id.clone(),
            default_branch: binding.default_branch.clone(),
            clean: binding.clean.clone(),
            checkout_submodules: binding.checkout_submodules.clone(),
        };
        pipeline.triggers = binding.triggers.clone();
        Ok(())
    }

    async fn queue_build(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        source_branch: &str,
    ) -> Result<u64, PipelineApiError> {
        let _active = self
            .enter(
                PipelineCall::QueueBuild {
                    pipeline_id,
                    source_branch: source_branch.to_string(),
                },
                Some(format!("queue:{}", pipeline_id)),
            )
            .await?;
        let mut state = self.lock();
        if !state.pipelines.contains_key(&pipeline_id) {
            return Err(Self::not_found(scope, pipeline_id));
        }
        state.next_build_id += 1;
        let build_id = 1000 + state.next_build_id;
        state.builds.insert(build_id, pipeline_id);
        Ok(build_id)
    }

    async fn get_build_status(
        &self,
        scope: &PipelineScope,
        build_id: u64,
    ) -> Result<BuildStatus, PipelineApiError> {
        let _active = self
            .enter(
                PipelineCall::GetBuildStatus { build_id },
                Some(format!("status:{}", build_id)),
            )
            .await?;
        let mut state = self.lock();
        let pipeline_id = *state
            .builds
            .get(&build_id)
            .ok_or_else(|| PipelineApiError::Rejected(format!("unknown build {}", build_id)))?;
        let url = Some(format!(
            "https://dev.azure.com/{}/{}/_build/results?buildId={}",
            scope.org, scope.project, build_id
        ));
        let scripted = state.build_scripts.get_mut(&pipeline_id).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        });
        Ok(match scripted {
            Some(status) => BuildStatus {
                url: status.url.or(url),
                ..status
            },
            None => BuildStatus {
                status: Some("completed".to_string()),
                result: Some("succeeded".to_string()),
                url,
            },
        })
    }

    async fn get_enabled_repositories(
        &self,
        _scope: &PipelineScope,
    ) -> Result<Vec<SourceRepository>, PipelineApiError> {
        let _active = self
            .enter(
                PipelineCall::GetEnabledRepositories,
                Some("repositories".to_string()),
            )
            .await?;
        Ok(self.lock().repositories.clone())
    }

    async fn get_pipelines_for_repository(
        &self,
        _scope: &PipelineScope,
        repo_id: &str,
    ) -> Result<Vec<String>, PipelineApiError> {
        let _active = self
            .enter(
                PipelineCall::GetPipelinesForRepository {
                    repo_id: repo_id.to_string(),
                },
                Some(format!("listing:{}", repo_id)),
            )
            .await?;
        let state = self.lock();
        let mut pipelines: Vec<&FakePipeline> = state
            .pipelines
            .values()
            .filter(|p| {
                p.repository.repo_id.as_deref() == Some(repo_id)
                    || p.repository.repo_name == repo_id
            })
            .collect();
        pipelines.sort_by_key(|p| p.id);
        Ok(pipelines.iter().map(|p| p.qualified_name()).collect())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

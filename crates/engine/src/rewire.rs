// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline rewiring between the source repository and GitHub

use crate::error::PipelineTestError;
use mig_adapters::{PipelineApi, PipelineApiError};
use mig_core::{GithubTarget, PipelineBinding, PipelineScope, PipelineSelector};

#[derive(Clone)]
pub struct PipelineRewirer<P> {
    api: P,
}

impl<P: PipelineApi> PipelineRewirer<P> {
    pub fn new(api: P) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &P {
        &self.api
    }

    /// Resolve a selector to a pipeline id; ids are taken as given
    pub async fn resolve_id(
        &self,
        scope: &PipelineScope,
        selector: &PipelineSelector,
    ) -> Result<u64, PipelineTestError> {
        match selector {
            PipelineSelector::Id(id) => Ok(*id),
            PipelineSelector::Name(name) => match self.api.get_pipeline_id(scope, name).await {
                Ok(id) => Ok(id),
                Err(PipelineApiError::PipelineNotFound { .. }) => {
                    Err(PipelineTestError::PipelineNotFound {
                        scope: scope.to_string(),
                        pipeline: name.clone(),
                    })
                }
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Snapshot everything needed to put the pipeline back later
    pub async fn capture_binding(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
    ) -> Result<PipelineBinding, PipelineApiError> {
        let repository = self.api.get_pipeline_repository(scope, pipeline_id).await?;
        let settings = self.api.get_pipeline(scope, pipeline_id).await?;
        Ok(PipelineBinding::from_parts(repository, settings.triggers))
    }

    /// Point the pipeline at GitHub, preserving the captured settings
    pub async fn rewire(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        target: &GithubTarget,
        binding: &PipelineBinding,
    ) -> Result<(), PipelineApiError> {
        self.api
            .rewire_pipeline(scope, pipeline_id, target, &binding.settings())
            .await
    }

    /// Re-apply a captured binding
    pub async fn restore(
        &self,
        scope: &PipelineScope,
        pipeline_id: u64,
        binding: &PipelineBinding,
    ) -> Result<(), PipelineApiError> {
        self.api.restore_pipeline(scope, pipeline_id, binding).await
    }

    /// Permanently rewire a pipeline to GitHub
    ///
    /// Unlike a dry run, nothing is captured for later restoration.
    pub async fn rewire_to_github(
        &self,
        scope: &PipelineScope,
        selector: &PipelineSelector,
        target: &GithubTarget,
    ) -> Result<u64, PipelineTestError> {
        let pipeline_id = self.resolve_id(scope, selector).await?;
        let settings = self.api.get_pipeline(scope, pipeline_id).await?;
        self.api
            .rewire_pipeline(scope, pipeline_id, target, &settings)
            .await?;
        tracing::info!(
            pipeline_id,
            "Successfully rewired pipeline to {}/{}",
            target.org,
            target.repo
        );
        Ok(pipeline_id)
    }
}

#[cfg(test)]
#[path = "rewire_tests.rs"]
mod tests;

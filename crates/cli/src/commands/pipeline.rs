// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mig rewire-pipeline` and `mig test-pipelines`

use crate::config::{resolve_token, ADO_PAT_ENV, DEFAULT_ADO_SERVER_URL, DEFAULT_GITHUB_API_URL};
use crate::error::CliError;
use crate::output::{self, BatchOutcome, DryRunReport, OutputFormat};
use anyhow::Result;
use clap::Args;
use mig_adapters::{AdoPipelineApi, FileReportSink, InventoryCache, TracedPipelineApi};
use mig_core::{GithubTarget, PipelineFilter, PipelineScope, PipelineSelector, SystemClock};
use mig_engine::{
    BatchOrchestrator, BatchRequest, DryRunEngine, DryRunRequest, EngineConfig, PipelineRewirer,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

type Api = TracedPipelineApi<AdoPipelineApi>;

/// Azure DevOps organization and team project
#[derive(Args)]
pub struct AdoArgs {
    #[arg(long)]
    pub ado_org: String,

    #[arg(long)]
    pub ado_team_project: String,

    /// Personal access token, defaults to $ADO_PAT
    #[arg(long)]
    pub ado_pat: Option<String>,

    #[arg(long, default_value = DEFAULT_ADO_SERVER_URL)]
    pub ado_server_url: String,
}

impl AdoArgs {
    fn scope(&self) -> PipelineScope {
        PipelineScope::new(&self.ado_org, &self.ado_team_project)
    }

    fn api(&self) -> Result<Api, CliError> {
        let pat = resolve_token(self.ado_pat.as_deref(), ADO_PAT_ENV, "--ado-pat")?;
        let cache = Arc::new(InventoryCache::default());
        Ok(TracedPipelineApi::new(AdoPipelineApi::new(
            &self.ado_server_url,
            &pat,
            cache,
        )))
    }
}

/// GitHub repository the pipelines get pointed at
#[derive(Args)]
pub struct TargetArgs {
    #[arg(long)]
    pub github_org: String,

    #[arg(long)]
    pub github_repo: String,

    /// Azure DevOps service connection that can reach GitHub
    #[arg(long)]
    pub service_connection_id: String,

    /// API root of the GitHub instance, for GitHub Enterprise Server
    #[arg(long, default_value = DEFAULT_GITHUB_API_URL)]
    pub target_api_url: String,
}

impl TargetArgs {
    fn target(&self) -> GithubTarget {
        GithubTarget::new(
            &self.github_org,
            &self.github_repo,
            &self.service_connection_id,
        )
        .with_api_url(&self.target_api_url)
    }
}

fn monitor_timeout(minutes: Option<u64>, config: &EngineConfig) -> Duration {
    minutes
        .map(|m| Duration::from_secs(m.saturating_mul(60)))
        .unwrap_or(config.monitor_timeout)
}

#[derive(Args)]
pub struct RewirePipelineArgs {
    #[command(flatten)]
    pub ado: AdoArgs,

    /// Pipeline name, optionally with its folder (e.g. "\Services\CI")
    #[arg(long)]
    pub ado_pipeline: Option<String>,

    #[arg(long)]
    pub ado_pipeline_id: Option<u64>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Test the pipeline against GitHub and restore it afterwards
    #[arg(long)]
    pub dry_run: bool,

    /// How long to watch the dry-run build
    #[arg(long)]
    pub monitor_timeout_minutes: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

pub async fn rewire_pipeline(args: RewirePipelineArgs, config: &EngineConfig) -> Result<()> {
    let selector = PipelineSelector::from_options(args.ado_pipeline.clone(), args.ado_pipeline_id)
        .map_err(CliError::pipeline_selector)?;
    let api = args.ado.api()?;
    let scope = args.ado.scope();
    let target = args.target.target();

    if !args.dry_run {
        tracing::info!("Rewiring Pipeline to GitHub repo...");
        PipelineRewirer::new(api)
            .rewire_to_github(&scope, &selector, &target)
            .await?;
        return Ok(());
    }

    tracing::info!("Starting dry-run test of pipeline {} in {}", selector, scope);
    let engine = DryRunEngine::new(api, SystemClock, config.build_poll_interval);
    let request = DryRunRequest {
        scope,
        selector,
        target,
        monitor_timeout: monitor_timeout(args.monitor_timeout_minutes, config),
    };

    match engine.test_pipeline(&request).await {
        Ok(result) => {
            output::print(&DryRunReport(&result), args.output);
            if result.needs_manual_restoration() {
                return Err(CliError::manual_restoration(&[&result]).into());
            }
            Ok(())
        }
        Err(e) => {
            if let Some(result) = e.partial_result() {
                output::print(&DryRunReport(result), args.output);
            }
            Err(e.into())
        }
    }
}

#[derive(Args)]
pub struct TestPipelinesArgs {
    #[command(flatten)]
    pub ado: AdoArgs,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Only test pipelines whose name matches this wildcard pattern
    #[arg(long)]
    pub pipeline_filter: Option<String>,

    /// Pipelines tested at once
    #[arg(long)]
    pub max_concurrent_tests: Option<usize>,

    #[arg(long, default_value = "pipeline-test-report.json")]
    pub report_path: PathBuf,

    /// How long to watch each build
    #[arg(long)]
    pub monitor_timeout_minutes: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

pub async fn test_pipelines(args: TestPipelinesArgs, config: &EngineConfig) -> Result<()> {
    let mut config = config.clone();
    if let Some(max) = args.max_concurrent_tests {
        config.max_concurrency = max;
    }
    config.validate()?;

    let filter = PipelineFilter::new(args.pipeline_filter.as_deref()).map_err(|e| {
        CliError::invalid_filter(args.pipeline_filter.as_deref().unwrap_or_default(), e)
    })?;
    let api = args.ado.api()?;

    let orchestrator = BatchOrchestrator::new(
        api,
        SystemClock,
        FileReportSink::new(),
        config.build_poll_interval,
    );
    let request = BatchRequest {
        scope: args.ado.scope(),
        target: args.target.target(),
        filter,
        max_concurrency: config.max_concurrency,
        monitor_timeout: monitor_timeout(args.monitor_timeout_minutes, &config),
        report_path: args.report_path,
    };

    let Some(summary) = orchestrator.run(&request).await? else {
        return Ok(());
    };
    output::print(&BatchOutcome(&summary), args.output);

    let stranded: Vec<_> = summary.requiring_manual_restoration().collect();
    if !stranded.is_empty() {
        return Err(CliError::manual_restoration(&stranded).into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

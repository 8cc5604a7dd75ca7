// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mig wait-for-migration`, `mig migrate-org` and `mig download-logs`

use crate::config::{
    optional_token, resolve_token, DEFAULT_GITHUB_API_URL, GH_PAT_ENV, GH_SOURCE_PAT_ENV,
};
use crate::error::CliError;
use anyhow::Result;
use clap::Args;
use mig_adapters::{GithubMigrationApi, TracedMigrationApi};
use mig_core::{MigrationKind, OrganizationMigrationRequest};
use mig_engine::{EngineConfig, MigrationError, MigrationPoller};
use std::path::PathBuf;

type Poller = MigrationPoller<TracedMigrationApi<GithubMigrationApi>>;

/// Connection to the target GitHub instance
#[derive(Args)]
pub struct GithubArgs {
    /// Personal access token for the target, defaults to $GH_PAT
    #[arg(long)]
    pub github_pat: Option<String>,

    /// API URL of the target instance
    #[arg(long, default_value = DEFAULT_GITHUB_API_URL)]
    pub target_api_url: String,
}

impl GithubArgs {
    fn poller(&self, config: &EngineConfig, source_pat: Option<&str>) -> Result<Poller, CliError> {
        let token = resolve_token(self.github_pat.as_deref(), GH_PAT_ENV, "--github-pat")?;
        let mut api =
            GithubMigrationApi::new(&self.target_api_url, &token).with_retry(config.retry.clone());
        if let Some(source) = optional_token(source_pat, GH_SOURCE_PAT_ENV) {
            api = api.with_source_token(source);
        }
        Ok(MigrationPoller::from_config(
            TracedMigrationApi::new(api),
            config,
        ))
    }
}

#[derive(Args)]
pub struct WaitForMigrationArgs {
    /// Id of a repository (RM_) or organization (OM_) migration
    #[arg(long)]
    pub migration_id: String,

    #[command(flatten)]
    pub github: GithubArgs,
}

pub async fn wait_for_migration(args: WaitForMigrationArgs, config: &EngineConfig) -> Result<()> {
    if MigrationKind::from_id(&args.migration_id).is_none() {
        return Err(MigrationError::InvalidMigrationId(args.migration_id).into());
    }
    let poller = args.github.poller(config, None)?;
    poller.wait_for_migration(&args.migration_id).await?;
    Ok(())
}

#[derive(Args)]
pub struct MigrateOrgArgs {
    /// Organization to migrate from
    #[arg(long)]
    pub github_source_org: String,

    /// Organization to create on the target
    #[arg(long)]
    pub github_target_org: String,

    /// Enterprise that will own the target organization
    #[arg(long)]
    pub github_target_enterprise: String,

    /// Token for the source organization, defaults to $GH_SOURCE_PAT then the target token
    #[arg(long)]
    pub github_source_pat: Option<String>,

    /// Start the migration without waiting for it
    #[arg(long)]
    pub queue_only: bool,

    #[command(flatten)]
    pub github: GithubArgs,
}

pub async fn migrate_org(args: MigrateOrgArgs, config: &EngineConfig) -> Result<()> {
    let poller = args
        .github
        .poller(config, args.github_source_pat.as_deref())?;
    let request = OrganizationMigrationRequest {
        source_org_url: format!("https://github.com/{}", args.github_source_org),
        target_org_name: args.github_target_org,
        target_enterprise: args.github_target_enterprise,
    };
    let id = poller.migrate_organization(&request, args.queue_only).await?;
    println!("{}", id);
    Ok(())
}

#[derive(Args)]
pub struct DownloadLogsArgs {
    #[arg(long)]
    pub github_org: String,

    #[arg(long)]
    pub github_repo: String,

    /// Where to save the log, defaults to migration-log-{org}-{repo}.log
    #[arg(long)]
    pub migration_log_file: Option<PathBuf>,

    /// Replace an existing log file
    #[arg(long)]
    pub overwrite: bool,

    #[command(flatten)]
    pub github: GithubArgs,
}

pub fn default_log_file(org: &str, repo: &str) -> PathBuf {
    PathBuf::from(format!("migration-log-{}-{}.log", org, repo))
}

pub async fn download_logs(args: DownloadLogsArgs, config: &EngineConfig) -> Result<()> {
    let file = args
        .migration_log_file
        .clone()
        .unwrap_or_else(|| default_log_file(&args.github_org, &args.github_repo));
    if file.exists() && !args.overwrite {
        return Err(CliError::file_exists(&file.display().to_string()).into());
    }

    let poller = args.github.poller(config, None)?;
    tracing::info!(
        "Downloading log for repository {} to {}...",
        args.github_repo,
        file.display()
    );
    let log = poller
        .download_migration_log(&args.github_org, &args.github_repo)
        .await?;
    tokio::fs::write(&file, log).await?;
    tracing::info!("Downloaded {} log to {}.", args.github_repo, file.display());
    Ok(())
}

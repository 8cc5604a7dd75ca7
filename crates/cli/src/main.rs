// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mig - migrate repositories to GitHub and cut pipelines over

mod commands;
mod config;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{migration, pipeline};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::error::CliError;

#[derive(Parser)]
#[command(
    name = "mig",
    version,
    about = "Drive GitHub migrations and test Azure DevOps pipelines against migrated repositories"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, global = true)]
    verbose: bool,

    /// TOML file with engine settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for a repository or organization migration to finish
    WaitForMigration(migration::WaitForMigrationArgs),
    /// Start an organization migration
    MigrateOrg(migration::MigrateOrgArgs),
    /// Download the log of a repository's latest migration
    DownloadLogs(migration::DownloadLogsArgs),
    /// Point a pipeline at its migrated GitHub repository, or test that with --dry-run
    RewirePipeline(pipeline::RewirePipelineArgs),
    /// Dry-run test every pipeline of a team project against GitHub
    TestPipelines(pipeline::TestPipelinesArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<CliError>() {
                Some(cli_error) => eprint!("{}", cli_error),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::load_engine_config(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::WaitForMigration(args) => migration::wait_for_migration(args, &config).await,
        Commands::MigrateOrg(args) => migration::migrate_org(args, &config).await,
        Commands::DownloadLogs(args) => migration::download_logs(args, &config).await,
        Commands::RewirePipeline(args) => pipeline::rewire_pipeline(args, &config).await,
        Commands::TestPipelines(args) => pipeline::test_pipelines(args, &config).await,
    }
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

//! Trending Catalog
//!
//! Fetches trending tokens, renders them as dated markdown documents and mirrors them,
//! together with a generated index page, into a GitHub repository.

mod chain;
mod config;
mod errors;
mod fetch;
mod index;
mod models;
mod pipeline;
mod publish;
mod remote;
mod render;

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use errors::AppError;
use pipeline::{Orchestrator, RunReport};
use remote::{GitHubClient, RemoteSync};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return exit_code(e.exit_code());
        }
    };

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Trending Catalog");
    tracing::info!("Output directory: {:?}", config.output_dir);
    tracing::info!("Stages: {:?}", config.stages);

    match run(config).await {
        Ok(report) => {
            tracing::info!(
                "Run finished: {} tokens fetched, {} documents written, {} files synced",
                report.tokens_fetched,
                report.documents_written.len(),
                report.files_synced
            );
            if let Some(reason) = &report.fetch_failure {
                tracing::warn!("Upstream fetch failed this run: {}", reason);
            }
            if report.index_refreshed == Some(false) {
                tracing::warn!("Index was not refreshed this run");
            }
            if report.exit_code() == 0 {
                tracing::info!("All operations completed successfully!");
            }
            exit_code(report.exit_code())
        }
        Err(e) => {
            tracing::error!("Error in main process: {}", e);
            tracing::error!("{:?}", e);
            exit_code(e.exit_code())
        }
    }
}

async fn run(config: Config) -> Result<RunReport, AppError> {
    let sync = match &config.remote {
        Some(remote) => Some(RemoteSync::new(GitHubClient::new(
            remote,
            config.http_timeout,
        )?)),
        None => {
            tracing::warn!(
                "No remote configured (TRENDING_GITHUB_TOKEN, TRENDING_OWNER). Remote publishing is disabled!"
            );
            None
        }
    };

    Orchestrator::new(config, sync)?.run().await
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

//! Run orchestration: fetch and publish, sync, then index.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::errors::{AppError, EXIT_DEGRADED};
use crate::fetch::{FetchOutcome, TrendingFetcher};
use crate::index::IndexGenerator;
use crate::models::Publication;
use crate::publish::{LocalPublisher, TRENDING_DIR};
use crate::remote::{RemoteRepository, RemoteSync};
use crate::render::render_token;

/// Selectable pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Fetch trending tokens, render them and write them locally
    Fetch,
    /// Mirror this run's documents and the category content remotely
    Sync,
    /// Regenerate and publish the index page
    Index,
}

impl Stage {
    /// Parse a comma-separated stage list; result is deduplicated and in execution order.
    pub fn parse_list(raw: &str) -> Result<Vec<Stage>, AppError> {
        let mut stages = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Stage::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        stages.sort();
        stages.dedup();
        Ok(stages)
    }
}

impl FromStr for Stage {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fetch" => Ok(Stage::Fetch),
            "sync" => Ok(Stage::Sync),
            "index" => Ok(Stage::Index),
            other => Err(AppError::Config(format!(
                "Unknown stage '{}' (expected fetch, sync or index)",
                other
            ))),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => f.write_str("fetch"),
            Stage::Sync => f.write_str("sync"),
            Stage::Index => f.write_str("index"),
        }
    }
}

/// What a run did.
#[derive(Debug, Default)]
pub struct RunReport {
    pub tokens_fetched: usize,
    pub documents_written: Vec<PathBuf>,
    pub files_synced: usize,
    /// Set when the fetch stage ran and the upstream call failed
    pub fetch_failure: Option<String>,
    /// `None` when the index stage did not run
    pub index_refreshed: Option<bool>,
}

impl RunReport {
    /// Process exit code: 0, or the degraded code when a non-fatal stage failed.
    pub fn exit_code(&self) -> i32 {
        if self.fetch_failure.is_some() || self.index_refreshed == Some(false) {
            EXIT_DEGRADED
        } else {
            0
        }
    }
}

/// Sequences the selected stages.
pub struct Orchestrator<R> {
    config: Config,
    fetcher: TrendingFetcher,
    publisher: LocalPublisher,
    index: IndexGenerator,
    sync: Option<RemoteSync<R>>,
}

impl<R: RemoteRepository> Orchestrator<R> {
    pub fn new(config: Config, sync: Option<RemoteSync<R>>) -> Result<Self, AppError> {
        config.validate()?;
        let fetcher = TrendingFetcher::new(&config.upstream_url, config.http_timeout)?;
        let publisher = LocalPublisher::new(config.trending_dir());
        let index = IndexGenerator::new(config.trending_dir(), config.index_path());

        Ok(Self {
            config,
            fetcher,
            publisher,
            index,
            sync,
        })
    }

    /// Run the selected stages under the configured deadline.
    pub async fn run(&self) -> Result<RunReport, AppError> {
        tokio::time::timeout(self.config.run_deadline, self.run_stages(Utc::now())).await?
    }

    async fn run_stages(&self, started_at: DateTime<Utc>) -> Result<RunReport, AppError> {
        let mut report = RunReport::default();
        let mut published = Vec::new();

        if self.selected(Stage::Fetch) {
            published = self.fetch_and_publish(started_at, &mut report).await?;
        }

        if self.selected(Stage::Sync) {
            report.files_synced = self.sync_published(&published).await?;
        }

        if self.selected(Stage::Index) {
            tracing::info!("Stage index: regenerating index");
            report.index_refreshed = Some(self.index.refresh(self.sync.as_ref(), Utc::now()).await);
        }

        Ok(report)
    }

    fn selected(&self, stage: Stage) -> bool {
        let selected = self.config.stages.contains(&stage);
        if !selected {
            tracing::info!("Stage {} not selected, skipping", stage);
        }
        selected
    }

    async fn fetch_and_publish(
        &self,
        started_at: DateTime<Utc>,
        report: &mut RunReport,
    ) -> Result<Vec<Publication>, AppError> {
        tracing::info!("Stage fetch: requesting trending tokens");
        let tokens = match self.fetcher.fetch().await {
            FetchOutcome::Fetched(tokens) => tokens,
            FetchOutcome::Failed { reason } => {
                report.fetch_failure = Some(reason);
                Vec::new()
            }
        };
        report.tokens_fetched = tokens.len();

        let date = started_at.format("%Y-%m-%d").to_string();
        let mut seen = HashSet::new();
        let mut published = Vec::with_capacity(tokens.len());

        for token in &tokens {
            let publication = Publication {
                date: date.clone(),
                name: token.publication_name(),
            };
            if !seen.insert(publication.clone()) {
                tracing::warn!("Duplicate publication {}, overwriting", publication);
            }

            let document = render_token(token, Utc::now());
            let path = self.publisher.publish(&document, &publication).await?;
            tracing::info!("Created file: {}", path.display());

            report.documents_written.push(path);
            published.push(publication);
        }
        Ok(published)
    }

    async fn sync_published(&self, published: &[Publication]) -> Result<usize, AppError> {
        let Some(sync) = &self.sync else {
            return Err(AppError::Config(
                "The sync stage needs a remote repository".to_string(),
            ));
        };

        tracing::info!("Stage sync: mirroring to {}", self.config.repo_name);
        sync.ensure_repository().await?;

        let mut synced = 0;
        let mut done = HashSet::new();
        for publication in published {
            if !done.insert(publication) {
                continue;
            }
            let remote_base = format!("{}/{}/{}", TRENDING_DIR, publication.date, publication.name);
            let dir = self.publisher.directory_for(publication);
            synced += sync.sync_directory(&dir, &remote_base).await?.len();
        }

        let category_dir = self.config.category_dir();
        if tokio::fs::metadata(&category_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            let remote_base = format!("content/{}", self.config.category);
            synced += sync.sync_directory(&category_dir, &remote_base).await?.len();
        }

        tracing::info!("Synced {} files", synced);
        Ok(synced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stage_list() {
        assert_eq!(
            Stage::parse_list("index, fetch,sync,fetch").unwrap(),
            vec![Stage::Fetch, Stage::Sync, Stage::Index]
        );
        assert_eq!(Stage::parse_list("INDEX").unwrap(), vec![Stage::Index]);
        assert!(Stage::parse_list("").unwrap().is_empty());
        assert!(Stage::parse_list("fetch,publish").is_err());
    }

    #[test]
    fn test_report_exit_code() {
        let mut report = RunReport::default();
        assert_eq!(report.exit_code(), 0);

        report.index_refreshed = Some(true);
        assert_eq!(report.exit_code(), 0);

        report.index_refreshed = Some(false);
        assert_eq!(report.exit_code(), EXIT_DEGRADED);

        report.index_refreshed = Some(true);
        report.fetch_failure = Some("connection refused".to_string());
        assert_eq!(report.exit_code(), EXIT_DEGRADED);
    }
}

//! Root index page listing every published document by date.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::IndexEntry;
use crate::publish::TRENDING_DIR;
use crate::remote::{RemoteRepository, RemoteSync};
use crate::render::iso_timestamp;

/// File name of the index page, locally and remotely.
pub const INDEX_FILE: &str = "README.md";

const INDEX_HEADER: &str = "# Moralis Trending Catalog

This repository contains information about various cryptocurrency tokens that has been trending on Moralis, organized by date.

## Available Collections

";

/// One date partition and its entries, entries in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePartition {
    pub date: String,
    pub entries: Vec<IndexEntry>,
}

/// Builds, writes and publishes the index page.
#[derive(Debug, Clone)]
pub struct IndexGenerator {
    trending_dir: PathBuf,
    index_path: PathBuf,
}

impl IndexGenerator {
    pub fn new(trending_dir: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            trending_dir: trending_dir.into(),
            index_path: index_path.into(),
        }
    }

    /// Regenerate the index and publish it when a remote is given.
    ///
    /// Failures are logged and reported as `false`; they never reach the caller.
    pub async fn refresh<R: RemoteRepository>(
        &self,
        sync: Option<&RemoteSync<R>>,
        now: DateTime<Utc>,
    ) -> bool {
        match self.regenerate(sync, now).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error generating index: {}", e);
                false
            }
        }
    }

    async fn regenerate<R: RemoteRepository>(
        &self,
        sync: Option<&RemoteSync<R>>,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let partitions = self.scan().await?;
        let content = render_index(&partitions, now);
        self.write(&content).await?;
        tracing::info!(
            "Generated {} with {} date sections",
            self.index_path.display(),
            partitions.len()
        );

        match sync {
            Some(sync) => {
                sync.upsert_file(INDEX_FILE, content.into_bytes()).await?;
                tracing::info!("{} generated and pushed", INDEX_FILE);
            }
            None => tracing::warn!("No remote configured; {} not published", INDEX_FILE),
        }
        Ok(())
    }

    /// List date partitions newest first, each with its entries in ascending order.
    pub async fn scan(&self) -> Result<Vec<DatePartition>, AppError> {
        let mut dates = match list_names(&self.trending_dir, true).await {
            Ok(dates) => dates,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(AppError::filesystem(&self.trending_dir, e)),
        };
        dates.sort_by(|a, b| b.cmp(a));

        let mut partitions = Vec::with_capacity(dates.len());
        for date in dates {
            let dir = self.trending_dir.join(&date);
            let mut files = list_names(&dir, false)
                .await
                .map_err(|e| AppError::filesystem(&dir, e))?;
            files.sort();

            let entries = files
                .into_iter()
                .map(|file| IndexEntry {
                    date: date.clone(),
                    file,
                })
                .collect();
            partitions.push(DatePartition { date, entries });
        }
        Ok(partitions)
    }

    /// Replace the index file in one step: write a sibling, then rename over it.
    async fn write(&self, content: &str) -> Result<(), AppError> {
        let file_name = self
            .index_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| INDEX_FILE.to_string());
        let staging = self.index_path.with_file_name(format!(".{}.tmp", file_name));

        tokio::fs::write(&staging, content)
            .await
            .map_err(|e| AppError::filesystem(&staging, e))?;
        if let Err(e) = tokio::fs::rename(&staging, &self.index_path).await {
            tokio::fs::remove_file(&staging).await.ok();
            return Err(AppError::filesystem(&self.index_path, e));
        }
        Ok(())
    }
}

/// Assemble the index page text.
pub fn render_index(partitions: &[DatePartition], now: DateTime<Utc>) -> String {
    let mut content = String::from(INDEX_HEADER);

    for partition in partitions {
        content.push_str(&format!("### {}\n\n", partition.date));
        for entry in &partition.entries {
            content.push_str(&format!(
                "- [{}]({}/{}/{})\n",
                entry.title(),
                TRENDING_DIR,
                entry.date,
                entry.file
            ));
        }
        content.push('\n');
    }

    content.push_str(&format!("\n## Last Updated: {}", iso_timestamp(now)));
    content
}

/// Names directly inside `dir`; with `dirs_only`, only subdirectories.
async fn list_names(dir: &Path, dirs_only: bool) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if dirs_only && !entry.file_type().await?.is_dir() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

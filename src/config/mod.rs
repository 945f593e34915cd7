//! Configuration module for the trending catalog.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;
use crate::pipeline::Stage;

pub const DEFAULT_UPSTREAM_URL: &str =
    "https://moralis-money-coins.aws-prod-money-2.moralis.io/coins/get-trending-coins";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Settings for the remote repository API.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Bearer credential
    pub token: String,
    /// Account that owns the catalog repository
    pub owner: String,
    /// Catalog repository name
    pub repo: String,
    /// API base URL, without trailing slash
    pub api_url: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote repository settings; `None` when no token or owner is configured
    pub remote: Option<RemoteConfig>,
    /// Remote repository name (kept even when remote publishing is off, for logging)
    pub repo_name: String,
    /// Default content category mirrored from `content/{category}`
    pub category: String,
    /// Upstream trending endpoint
    pub upstream_url: String,
    /// Local root holding `trending/`, `content/` and the index page
    pub output_dir: PathBuf,
    /// Stages to run, in pipeline order
    pub stages: Vec<Stage>,
    /// Timeout applied to every network call
    pub http_timeout: Duration,
    /// Deadline for the whole run
    pub run_deadline: Duration,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let token = non_empty_var("TRENDING_GITHUB_TOKEN");
        let owner = non_empty_var("TRENDING_OWNER");

        let repo_name =
            env::var("TRENDING_REPO_NAME").unwrap_or_else(|_| "crypto-coins-catalog".to_string());

        let api_url = env::var("TRENDING_GITHUB_API_URL")
            .unwrap_or_else(|_| DEFAULT_GITHUB_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let remote = match (token, owner) {
            (Some(token), Some(owner)) => Some(RemoteConfig {
                token,
                owner,
                repo: repo_name.clone(),
                api_url,
            }),
            _ => None,
        };

        let category = env::var("TRENDING_CATEGORY").unwrap_or_else(|_| "defi".to_string());

        let upstream_url =
            env::var("TRENDING_UPSTREAM_URL").unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string());

        let output_dir = env::var("TRENDING_OUTPUT_DIR")
            .unwrap_or_else(|_| ".".to_string())
            .into();

        let stages = Stage::parse_list(
            &env::var("TRENDING_STAGES").unwrap_or_else(|_| "index".to_string()),
        )?;

        let http_timeout = Duration::from_secs(parse_secs("TRENDING_HTTP_TIMEOUT_SECS", 30)?);
        let run_deadline = Duration::from_secs(parse_secs("TRENDING_RUN_DEADLINE_SECS", 600)?);

        let log_level = env::var("TRENDING_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let config = Self {
            remote,
            repo_name,
            category,
            upstream_url,
            output_dir,
            stages,
            http_timeout,
            run_deadline,
            log_level,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject stage selections that cannot run with the given settings.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.stages.contains(&Stage::Sync) && self.remote.is_none() {
            return Err(AppError::Config(
                "The sync stage needs TRENDING_GITHUB_TOKEN and TRENDING_OWNER".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory holding the date partitions.
    pub fn trending_dir(&self) -> PathBuf {
        self.output_dir.join(crate::publish::TRENDING_DIR)
    }

    /// Directory holding the default category's extra content.
    pub fn category_dir(&self) -> PathBuf {
        self.output_dir.join("content").join(&self.category)
    }

    /// Path of the generated index page.
    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join(crate::index::INDEX_FILE)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_secs(key: &str, default: u64) -> Result<u64, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid {} value: '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}

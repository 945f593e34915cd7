//! Client for the upstream trending endpoint.

use std::time::Duration;

use crate::errors::AppError;
use crate::models::{TokenRecord, TrendingResponse};

/// Result of a trending fetch. Failures are reported, never raised.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(Vec<TokenRecord>),
    Failed { reason: String },
}

/// Issues a single GET to the upstream trending endpoint.
pub struct TrendingFetcher {
    url: String,
    client: reqwest::Client,
}

impl TrendingFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Fetch the current trending list.
    pub async fn fetch(&self) -> FetchOutcome {
        match self.fetch_coins().await {
            Ok(coins) => {
                tracing::info!("Fetched {} trending tokens", coins.len());
                FetchOutcome::Fetched(coins)
            }
            Err(e) => {
                tracing::error!("Error fetching trending tokens from {}: {}", self.url, e);
                FetchOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn fetch_coins(&self) -> Result<Vec<TokenRecord>, AppError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(upstream_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Upstream returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response.text().await.map_err(upstream_error)?;
        let parsed: TrendingResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Upstream(format!("Malformed trending response: {}", e)))?;

        Ok(parsed.coins)
    }
}

fn upstream_error(err: reqwest::Error) -> AppError {
    match AppError::from(err) {
        AppError::Timeout(msg) => AppError::Timeout(msg),
        other => AppError::Upstream(other.message()),
    }
}

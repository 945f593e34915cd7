//! GitHub REST API client for the catalog repository.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use super::RemoteRepository;
use crate::config::RemoteConfig;
use crate::errors::AppError;
use crate::models::{
    CreateRepositoryRequest, PutFileRequest, RemoteFile, RepositoryCreation, RepositoryInfo,
};

const API_VERSION: &str = "2022-11-28";

/// Client bound to one `{owner}/{repo}`.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: Url,
    owner: String,
    repo: String,
}

impl GitHubClient {
    pub fn new(config: &RemoteConfig, timeout: Duration) -> Result<Self, AppError> {
        let api_url = Url::parse(&config.api_url).map_err(|e| {
            AppError::Config(format!("Invalid GitHub API URL '{}': {}", config.api_url, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers(&config.token)?)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
        })
    }

    /// Build an API URL from path segments, percent-encoding each one.
    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, AppError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("Unusable GitHub API URL: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn contents_url(&self, path: &str) -> Result<Url, AppError> {
        let prefix = ["repos", self.owner.as_str(), self.repo.as_str(), "contents"];
        self.url(prefix.into_iter().chain(path.split('/').filter(|s| !s.is_empty())))
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
        let status = response.status();
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to deserialize GitHub response: {}", e);
            AppError::remote(status.as_u16(), format!("Unexpected response body: {}", e))
        })
    }

    async fn failure(response: reqwest::Response) -> AppError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        AppError::remote(status, error_message(&body))
    }
}

fn default_headers(token: &str) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static("trending-catalog"));
    headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| AppError::Config("Invalid GitHub token format".to_string()))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    Ok(headers)
}

/// Pull `message` out of a GitHub error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl RemoteRepository for GitHubClient {
    async fn get_repository(&self) -> Result<Option<RepositoryInfo>, AppError> {
        let url = self.url(["repos", self.owner.as_str(), self.repo.as_str()])?;
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(Self::parse_json(response).await?)),
            _ => Err(Self::failure(response).await),
        }
    }

    async fn create_repository(&self, private: bool) -> Result<RepositoryCreation, AppError> {
        let url = self.url(["user", "repos"])?;
        let request = CreateRepositoryRequest {
            name: self.repo.clone(),
            private,
        };
        let response = self.client.post(url).json(&request).send().await?;

        match response.status() {
            s if s.is_success() => Ok(RepositoryCreation::Created),
            StatusCode::UNPROCESSABLE_ENTITY => {
                let body = response.text().await?;
                if body.contains("already exists") {
                    Ok(RepositoryCreation::AlreadyExists)
                } else {
                    Err(AppError::remote(422, error_message(&body)))
                }
            }
            _ => Err(Self::failure(response).await),
        }
    }

    async fn get_file(&self, path: &str) -> Result<Option<RemoteFile>, AppError> {
        let url = self.contents_url(path)?;
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(Self::parse_json(response).await?)),
            _ => Err(Self::failure(response).await),
        }
    }

    async fn put_file(&self, path: &str, request: &PutFileRequest) -> Result<(), AppError> {
        let url = self.contents_url(path)?;
        let response = self.client.put(url).json(request).send().await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::CONFLICT => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::Conflict {
                    path: path.to_string(),
                    message: error_message(&body),
                })
            }
            StatusCode::UNPROCESSABLE_ENTITY => {
                let body = response.text().await.unwrap_or_default();
                Err(put_rejection(path, &body))
            }
            _ => Err(Self::failure(response).await),
        }
    }
}

/// A 422 on a contents write is a revision conflict only when it names the sha.
fn put_rejection(path: &str, body: &str) -> AppError {
    let message = error_message(body);
    if message.contains("sha") {
        AppError::Conflict {
            path: path.to_string(),
            message,
        }
    } else {
        AppError::remote(422, message)
    }
}

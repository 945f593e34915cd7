//! Remote repository models matching the GitHub REST API payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A file to be mirrored remotely. `revision` is the blob SHA of the remote copy,
/// unknown until looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileState {
    pub path: String,
    pub content: Vec<u8>,
    pub revision: Option<String>,
}

/// Subset of `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Body of `POST /user/repos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRepositoryRequest {
    pub name: String,
    pub private: bool,
}

/// Outcome of a repository creation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryCreation {
    Created,
    AlreadyExists,
}

/// Subset of `GET /repos/{owner}/{repo}/contents/{path}` for a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Revision marker required to overwrite the file
    pub sha: String,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutFileRequest {
    pub message: String,
    /// Base64-encoded file content
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Which write was issued for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    Add,
    Update,
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOperation::Add => f.write_str("Add"),
            SyncOperation::Update => f.write_str("Update"),
        }
    }
}

/// A file written to the remote repository during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedFile {
    pub path: String,
    pub operation: SyncOperation,
}

//! Remote repository access.
//!
//! `RemoteRepository` is the seam between the sync protocol and the hosting API, so the
//! protocol can be exercised against an in-memory double.

mod github;
mod sync;

pub use github::*;
pub use sync::*;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{PutFileRequest, RemoteFile, RepositoryCreation, RepositoryInfo};

/// Operations consumed from the repository hosting API.
///
/// Lookups return `Ok(None)` for "not found"; every other failure is an error.
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Fetch the catalog repository.
    async fn get_repository(&self) -> Result<Option<RepositoryInfo>, AppError>;

    /// Create the catalog repository for the authenticated user.
    async fn create_repository(&self, private: bool) -> Result<RepositoryCreation, AppError>;

    /// Fetch the metadata (including revision marker) of a file.
    async fn get_file(&self, path: &str) -> Result<Option<RemoteFile>, AppError>;

    /// Create a file, or update it when `request.sha` is set.
    async fn put_file(&self, path: &str, request: &PutFileRequest) -> Result<(), AppError>;
}

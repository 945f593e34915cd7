//! Local publication of rendered documents into date partitions.

use std::path::PathBuf;

use crate::errors::AppError;
use crate::models::{Publication, RenderedDocument};

/// Directory under the output root holding the date partitions.
pub const TRENDING_DIR: &str = "trending";

/// File name of every published document.
pub const DOCUMENT_FILE: &str = "README.md";

/// Writes documents to `{base}/{date}/{name}/README.md`.
#[derive(Debug, Clone)]
pub struct LocalPublisher {
    base: PathBuf,
}

impl LocalPublisher {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Directory a publication lives in.
    pub fn directory_for(&self, publication: &Publication) -> PathBuf {
        self.base.join(&publication.date).join(&publication.name)
    }

    /// Write the document, creating missing directories and overwriting any previous copy.
    pub async fn publish(
        &self,
        document: &RenderedDocument,
        publication: &Publication,
    ) -> Result<PathBuf, AppError> {
        let dir = self.directory_for(publication);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::filesystem(&dir, e))?;

        let path = dir.join(DOCUMENT_FILE);
        tokio::fs::write(&path, document.as_str())
            .await
            .map_err(|e| AppError::filesystem(&path, e))?;

        tracing::debug!("Wrote {}", path.display());
        Ok(path)
    }
}

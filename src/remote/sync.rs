//! Create-or-update mirroring of local files into the remote repository.

use std::path::Path;

use base64::Engine;
use chrono::Utc;

use super::RemoteRepository;
use crate::errors::AppError;
use crate::models::{
    PutFileRequest, RemoteFileState, RepositoryCreation, SyncOperation, SyncedFile,
};
use crate::render::iso_timestamp;

/// Mirrors files into the remote repository one round trip at a time.
pub struct RemoteSync<R> {
    remote: R,
}

impl<R: RemoteRepository> RemoteSync<R> {
    pub fn new(remote: R) -> Self {
        Self { remote }
    }

    #[cfg(test)]
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Make sure the catalog repository exists, creating it as public if it does not.
    pub async fn ensure_repository(&self) -> Result<(), AppError> {
        if let Some(info) = self.remote.get_repository().await? {
            tracing::debug!(
                "Remote repository {} exists",
                info.full_name.as_deref().unwrap_or(&info.name)
            );
            return Ok(());
        }

        match self.remote.create_repository(false).await? {
            RepositoryCreation::Created => tracing::info!("Created remote repository"),
            RepositoryCreation::AlreadyExists => {
                tracing::info!("Remote repository was created concurrently")
            }
        }
        Ok(())
    }

    /// Upload every regular file directly inside `local_dir` to `{remote_base}/{file name}`.
    ///
    /// Files go in ascending name order; the first failure aborts the rest.
    pub async fn sync_directory(
        &self,
        local_dir: &Path,
        remote_base: &str,
    ) -> Result<Vec<SyncedFile>, AppError> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(local_dir)
            .await
            .map_err(|e| AppError::filesystem(local_dir, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::filesystem(local_dir, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| AppError::filesystem(&entry.path(), e))?;
            if file_type.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        let mut synced = Vec::with_capacity(names.len());
        for name in names {
            let local_path = local_dir.join(&name);
            let content = tokio::fs::read(&local_path)
                .await
                .map_err(|e| AppError::filesystem(&local_path, e))?;
            synced.push(self.upsert_file(&remote_path(remote_base, &name), content).await?);
        }
        Ok(synced)
    }

    /// Look up the remote copy of `path` and create or update it with `content`.
    pub async fn upsert_file(&self, path: &str, content: Vec<u8>) -> Result<SyncedFile, AppError> {
        let revision = self.remote.get_file(path).await?.map(|file| file.sha);
        self.write(&RemoteFileState {
            path: path.to_string(),
            content,
            revision,
        })
        .await
    }

    /// Write a file whose remote revision is already known: update with the marker when
    /// present, create otherwise.
    pub async fn write(&self, state: &RemoteFileState) -> Result<SyncedFile, AppError> {
        let operation = match state.revision {
            Some(_) => SyncOperation::Update,
            None => SyncOperation::Add,
        };

        let request = PutFileRequest {
            message: commit_message(operation, &state.path),
            content: base64::engine::general_purpose::STANDARD.encode(&state.content),
            sha: state.revision.clone(),
        };
        self.remote.put_file(&state.path, &request).await?;

        tracing::info!("{} {}", operation, state.path);
        Ok(SyncedFile {
            path: state.path.clone(),
            operation,
        })
    }
}

/// `"{Add|Update} {base name} - {timestamp}"`.
pub fn commit_message(operation: SyncOperation, path: &str) -> String {
    let base_name = path.rsplit('/').next().unwrap_or(path);
    format!("{} {} - {}", operation, base_name, iso_timestamp(Utc::now()))
}

fn remote_path(base: &str, name: &str) -> String {
    let base = base.trim_matches('/');
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::models::{RemoteFile, RepositoryInfo};

    /// In-memory remote recording every write.
    #[derive(Default)]
    struct FakeRemote {
        repo_exists: Mutex<bool>,
        create_reports_existing: bool,
        creations: Mutex<u32>,
        files: Mutex<HashMap<String, String>>,
        puts: Mutex<Vec<(String, PutFileRequest)>>,
        fail_lookup: bool,
        reject_path: Option<String>,
    }

    impl FakeRemote {
        fn with_file(path: &str, sha: &str) -> Self {
            let fake = Self::default();
            fake.files
                .lock()
                .unwrap()
                .insert(path.to_string(), sha.to_string());
            fake
        }
    }

    #[async_trait]
    impl RemoteRepository for FakeRemote {
        async fn get_repository(&self) -> Result<Option<RepositoryInfo>, AppError> {
            Ok((*self.repo_exists.lock().unwrap()).then(|| RepositoryInfo {
                name: "crypto-coins-catalog".to_string(),
                full_name: None,
            }))
        }

        async fn create_repository(&self, private: bool) -> Result<RepositoryCreation, AppError> {
            assert!(!private);
            *self.creations.lock().unwrap() += 1;
            if self.create_reports_existing {
                return Ok(RepositoryCreation::AlreadyExists);
            }
            *self.repo_exists.lock().unwrap() = true;
            Ok(RepositoryCreation::Created)
        }

        async fn get_file(&self, path: &str) -> Result<Option<RemoteFile>, AppError> {
            if self.fail_lookup {
                return Err(AppError::remote(401, "Bad credentials"));
            }
            Ok(self
                .files
                .lock()
                .unwrap()
                .get(path)
                .map(|sha| RemoteFile { sha: sha.clone() }))
        }

        async fn put_file(&self, path: &str, request: &PutFileRequest) -> Result<(), AppError> {
            let mut files = self.files.lock().unwrap();
            if self.reject_path.as_deref() == Some(path) || files.get(path) != request.sha.as_ref() {
                return Err(AppError::Conflict {
                    path: path.to_string(),
                    message: "sha does not match".to_string(),
                });
            }
            files.insert(path.to_string(), format!("sha-{}", request.content.len()));
            self.puts
                .lock()
                .unwrap()
                .push((path.to_string(), request.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_created_without_marker() {
        let sync = RemoteSync::new(FakeRemote::default());

        let synced = sync.upsert_file("README.md", b"# Catalog".to_vec()).await.unwrap();

        assert_eq!(synced.operation, SyncOperation::Add);
        let puts = sync.remote().puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        let (path, request) = &puts[0];
        assert_eq!(path, "README.md");
        assert_eq!(request.sha, None);
        assert_eq!(request.content, "IyBDYXRhbG9n");
        assert!(request.message.starts_with("Add README.md - "));
    }

    #[tokio::test]
    async fn test_existing_file_is_updated_with_its_marker() {
        let sync = RemoteSync::new(FakeRemote::with_file("README.md", "abc123"));

        let synced = sync.upsert_file("README.md", b"# Catalog".to_vec()).await.unwrap();

        assert_eq!(synced.operation, SyncOperation::Update);
        let puts = sync.remote().puts.lock().unwrap();
        assert_eq!(puts[0].1.sha.as_deref(), Some("abc123"));
        assert!(puts[0].1.message.starts_with("Update README.md - "));
    }

    #[tokio::test]
    async fn test_stale_marker_is_fatal() {
        let sync = RemoteSync::new(FakeRemote::with_file("README.md", "current"));

        let err = sync
            .write(&RemoteFileState {
                path: "README.md".to_string(),
                content: b"x".to_vec(),
                revision: Some("stale".to_string()),
            })
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "REVISION_CONFLICT");
        assert!(sync.remote().puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let sync = RemoteSync::new(FakeRemote {
            fail_lookup: true,
            ..Default::default()
        });

        let err = sync.upsert_file("README.md", Vec::new()).await.unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(sync.remote().puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_repository() {
        let sync = RemoteSync::new(FakeRemote::default());
        sync.ensure_repository().await.unwrap();
        sync.ensure_repository().await.unwrap();
        assert_eq!(*sync.remote().creations.lock().unwrap(), 1);

        let racing = RemoteSync::new(FakeRemote {
            create_reports_existing: true,
            ..Default::default()
        });
        racing.ensure_repository().await.unwrap();
        assert_eq!(*racing.remote().creations.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sync_directory_is_flat_and_ordered() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b.md"), "b").unwrap();
        std::fs::write(temp_dir.path().join("a.md"), "a").unwrap();
        std::fs::create_dir(temp_dir.path().join("nested")).unwrap();
        std::fs::write(temp_dir.path().join("nested/c.md"), "c").unwrap();

        let sync = RemoteSync::new(FakeRemote::with_file("content/defi/b.md", "old"));
        let synced = sync
            .sync_directory(temp_dir.path(), "content/defi/")
            .await
            .unwrap();

        assert_eq!(
            synced,
            vec![
                SyncedFile {
                    path: "content/defi/a.md".to_string(),
                    operation: SyncOperation::Add,
                },
                SyncedFile {
                    path: "content/defi/b.md".to_string(),
                    operation: SyncOperation::Update,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_sync_directory_aborts_on_first_failure() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.md"), "a").unwrap();
        std::fs::write(temp_dir.path().join("b.md"), "b").unwrap();

        let sync = RemoteSync::new(FakeRemote {
            reject_path: Some("a.md".to_string()),
            ..Default::default()
        });
        let err = sync.sync_directory(temp_dir.path(), "").await.unwrap_err();

        assert_eq!(err.error_code(), "REVISION_CONFLICT");
        assert!(sync.remote().puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let sync = RemoteSync::new(FakeRemote::default());
        let err = sync
            .sync_directory(&temp_dir.path().join("missing"), "")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "FILESYSTEM_ERROR");
    }

    #[test]
    fn test_commit_message_uses_base_name() {
        let message = commit_message(SyncOperation::Update, "trending/2024-01-02/pepe/README.md");
        assert!(message.starts_with("Update README.md - "));
        let timestamp = message.trim_start_matches("Update README.md - ");
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_remote_path() {
        assert_eq!(remote_path("", "README.md"), "README.md");
        assert_eq!(remote_path("/content/defi/", "a.md"), "content/defi/a.md");
    }
}

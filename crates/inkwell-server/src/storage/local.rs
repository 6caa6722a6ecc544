use super::{check_key, BlobStorage, StorageError};
use async_trait::async_trait;
use inkwell_common_log::spans::storage_span;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, Instrument};

/// Storage rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key).map(|relative| self.root.join(relative))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl BlobStorage for LocalStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| io_error(parent, e))?;
            }

            // Write next to the target and rename so readers never see a partial file.
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let temp_path = path.with_file_name(format!(".{file_name}.tmp"));
            tokio::fs::write(&temp_path, bytes)
                .await
                .map_err(|e| io_error(&temp_path, e))?;
            if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(io_error(&path, e));
            }

            debug!(bytes = bytes.len(), "Stored blob");
            Ok(())
        }
        .instrument(storage_span("put", key))
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.resolve(key)?;
        async {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    debug!("Deleted blob");
                    Ok(true)
                }
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(io_error(&path, e)),
            }
        }
        .instrument(storage_span("delete", key))
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.resolve(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| io_error(&path, e))
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key.trim_start_matches('/'))
    }
}

//! Blob storage for post images and export files.

mod local;

pub use local::LocalStorage;

use async_trait::async_trait;
use std::path::{Component, Path};
use thiserror::Error;

/// Storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage path: {0}")]
    InvalidPath(String),

    #[error("storage I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Keyed byte storage. Keys are relative, `/`-separated paths such as
/// `posts/abc.png` or `exports/pdf/users_20240101000000.pdf`.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Remove `key`. Returns whether something was removed.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Public URL the key is served under.
    fn url(&self, key: &str) -> String;
}

/// Reject keys that are empty, absolute or climb out of the root.
pub fn check_key(key: &str) -> Result<&Path, StorageError> {
    let path = Path::new(key);
    let valid = !key.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if valid {
        Ok(path)
    } else {
        Err(StorageError::InvalidPath(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_check_key() {
        assert!(check_key("posts/a.png").is_ok());
        assert!(check_key("exports/pdf/users.pdf").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("/etc/passwd").is_err());
        assert!(check_key("../secret").is_err());
        assert!(check_key("posts/../../x").is_err());
    }

    proptest! {
        #[test]
        fn test_plain_segments_accepted(segments in prop::collection::vec("[a-z0-9_]{1,8}", 1..5)) {
            prop_assert!(check_key(&segments.join("/")).is_ok());
        }

        #[test]
        fn test_parent_segment_rejected(
            head in prop::collection::vec("[a-z0-9_]{1,8}", 0..3),
            tail in prop::collection::vec("[a-z0-9_]{1,8}", 0..3),
        ) {
            let mut segments = head;
            segments.push("..".to_string());
            segments.extend(tail);
            prop_assert!(check_key(&segments.join("/")).is_err());
        }
    }
}

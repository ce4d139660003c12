// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! [`Storage`] implementations.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

use crate::traits::Storage;

const FILE_SCHEME: &str = "file://";

/// Stores files under a local directory.
///
/// URLs are `file://<absolute path>` unless a `base_url` is configured, in which case
/// they are `<base_url>/<filename>`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    base_url: Option<String>,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Only the final path component is kept so callers cannot escape the root.
    fn path_for(&self, filename: &str) -> io::Result<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty filename"))?;
        Ok(self.root.join(name))
    }

    fn resolve(&self, uri: &str) -> io::Result<PathBuf> {
        if let Some(base) = &self.base_url {
            if let Some(rest) = uri.strip_prefix(base.as_str()) {
                return self.path_for(rest.trim_start_matches('/'));
            }
        }
        if let Some(path) = uri.strip_prefix(FILE_SCHEME) {
            return Ok(PathBuf::from(path));
        }
        if uri.contains("://") {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported uri: {}", uri),
            ));
        }
        Ok(PathBuf::from(uri))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<String> {
        let path = self.path_for(filename)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;

        Ok(match &self.base_url {
            Some(base) => format!("{}/{}", base, path_file_name(&path)),
            None => {
                let absolute = tokio::fs::canonicalize(&path).await?;
                format!("{}{}", FILE_SCHEME, absolute.display())
            }
        })
    }

    async fn get_file(&self, uri: &str) -> io::Result<Vec<u8>> {
        let path = self.resolve(uri)?;
        tokio::fs::read(path).await
    }
}

fn path_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_read_back_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("store"));

        let url = storage.save("note.txt", b"hello").await.unwrap();

        assert!(url.starts_with("file://"));
        assert_eq!(storage.get_file(&url).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_base_url_and_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).with_base_url("http://files.local/");

        let url = storage.save("../../escape.txt", b"data").await.unwrap();

        assert_eq!(url, "http://files.local/escape.txt");
        assert!(dir.path().join("escape.txt").exists());
        assert_eq!(storage.get_file(&url).await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let storage = LocalStorage::new("unused");
        let err = storage.get_file("s3://bucket/key").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}

//! Local filesystem session.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use super::{EndpointKind, EntryKind, FileEntry, Session};
use crate::error::FerryError;

/// Session over the local filesystem.
///
/// Holds no connection state; it exists so local and remote endpoints can
/// be driven through the same [`Session`] trait.
pub struct LocalSession;

impl LocalSession {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Session for LocalSession {
    fn kind(&self) -> EndpointKind {
        EndpointKind::Local
    }

    async fn list(&self, path: &str) -> Result<Vec<FileEntry>, FerryError> {
        debug!("listing local directory {}", path);
        let mut read_dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| FerryError::from_io(path, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| FerryError::from_io(path, e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            // Follow symlinks so a link to a directory lists as a directory;
            // entries that cannot be stat'ed (broken links, races) are skipped.
            let metadata = match tokio::fs::metadata(entry.path()).await {
                Ok(m) => m,
                Err(_) => continue,
            };
            let kind = if metadata.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let modified_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or(DateTime::UNIX_EPOCH);
            entries.push(FileEntry {
                name,
                kind,
                modified_at,
            });
        }
        Ok(entries)
    }

    async fn stat(&self, path: &str) -> Result<FileEntry, FerryError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| FerryError::from_io(path, e))?;
        let name = std::path::Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(FileEntry {
            name,
            kind: if metadata.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            modified_at: metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or(DateTime::UNIX_EPOCH),
        })
    }

    async fn mkdir(&self, path: &str) -> Result<(), FerryError> {
        tokio::fs::create_dir(path)
            .await
            .map_err(|e| FerryError::from_io(path, e))
    }

    async fn remove(&self, path: &str) -> Result<(), FerryError> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| FerryError::from_io(path, e))
    }

    async fn rmdir(&self, path: &str) -> Result<(), FerryError> {
        tokio::fs::remove_dir(path)
            .await
            .map_err(|e| FerryError::from_io(path, e))
    }

    async fn open_read(
        &self,
        path: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, FerryError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| FerryError::from_io(path, e))?;
        Ok(Box::new(file))
    }

    async fn open_write(
        &self,
        path: &str,
    ) -> Result<Box<dyn AsyncWrite + Send + Unpin>, FerryError> {
        let file = tokio::fs::File::create(path)
            .await
            .map_err(|e| FerryError::from_io(path, e))?;
        Ok(Box::new(file))
    }

    async fn disconnect(&mut self) {}
}

//! Session abstraction over local and remote filesystems.
//!
//! A [`Session`] is one live handle to an endpoint, exposing the primitive
//! operations the transfer engine is built on. Local and remote endpoints
//! implement the same trait so listing and copying code is written once.

pub mod local;
pub mod remote;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

use crate::error::FerryError;

pub use local::LocalSession;
pub use remote::RemoteSession;

/// Which kind of endpoint a session is connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Local,
    Remote,
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
}

/// One entry of a directory listing.
///
/// `name` is a bare component: it never contains a path separator and is
/// never `.` or `..`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub kind: EntryKind,
    pub modified_at: DateTime<Utc>,
}

impl FileEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A connected handle to one filesystem endpoint.
///
/// All operations take endpoint-scoped absolute paths (`PathString` form:
/// native separators locally, `/`-separated remotely). Implementations are
/// not required to be safe for concurrent primitive calls; callers serialize
/// operations per session (see [`SessionRegistry`]).
#[async_trait]
pub trait Session: Send + Sync {
    fn kind(&self) -> EndpointKind;

    /// Raw, unordered listing of `path`. `.` and `..` are never returned.
    async fn list(&self, path: &str) -> Result<Vec<FileEntry>, FerryError>;

    /// Entry metadata for a single path.
    async fn stat(&self, path: &str) -> Result<FileEntry, FerryError>;

    /// Create a directory. May fail if it already exists; the transfer
    /// engine forgives that case (see `transfer::ensure_dir`).
    async fn mkdir(&self, path: &str) -> Result<(), FerryError>;

    /// Remove a single file.
    async fn remove(&self, path: &str) -> Result<(), FerryError>;

    /// Remove an empty directory.
    async fn rmdir(&self, path: &str) -> Result<(), FerryError>;

    /// Open `path` for streaming reads.
    async fn open_read(
        &self,
        path: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, FerryError>;

    /// Open `path` for writing, creating or truncating it.
    async fn open_write(
        &self,
        path: &str,
    ) -> Result<Box<dyn AsyncWrite + Send + Unpin>, FerryError>;

    /// Release the underlying connection. Idempotent; never fails. Safe to
    /// call on an already-closed session.
    async fn disconnect(&mut self);
}

/// Registry of live sessions, keyed by a caller-chosen id.
///
/// Each session sits behind a `tokio::sync::Mutex`; holding the lock is
/// what gives a transfer exclusive use of the session, so a second
/// operation queues behind the first instead of interleaving primitive
/// calls on one connection.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<tokio::sync::Mutex<Box<dyn Session>>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a session under `id`, replacing any previous holder.
    pub fn register(&self, id: impl Into<String>, session: Box<dyn Session>) {
        let id = id.into();
        info!("registering session {}", id);
        self.sessions
            .write()
            .insert(id, Arc::new(tokio::sync::Mutex::new(session)));
    }

    pub fn get(&self, id: &str) -> Option<Arc<tokio::sync::Mutex<Box<dyn Session>>>> {
        self.sessions.read().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<tokio::sync::Mutex<Box<dyn Session>>>> {
        self.sessions.write().remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.read().contains_key(id)
    }

    /// Disconnect and drop every registered session.
    pub async fn close_all(&self) {
        let ids: Vec<String> = self.sessions.read().keys().cloned().collect();
        info!("closing {} sessions", ids.len());
        for id in ids {
            if let Some(slot) = self.remove(&id) {
                slot.lock().await.disconnect().await;
            }
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registry_round_trip() {
        let registry = SessionRegistry::new();
        registry.register("left", Box::new(LocalSession::new()));
        assert!(registry.contains("left"));
        assert!(registry.get("left").is_some());
        assert!(registry.get("right").is_none());

        registry.close_all().await;
        assert!(!registry.contains("left"));
    }

    #[tokio::test]
    async fn registry_serializes_access_to_one_session() {
        let registry = SessionRegistry::new();
        registry.register("only", Box::new(LocalSession::new()));

        let slot = registry.get("only").unwrap();
        let guard = slot.lock().await;
        // A second operation must queue: the lock is unavailable while the
        // first holds it.
        assert!(slot.try_lock().is_err());
        drop(guard);
        assert!(slot.try_lock().is_ok());
    }
}

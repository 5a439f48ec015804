//! Shared test support.

use async_trait::async_trait;
use ferryfs::{EndpointKind, FerryError, FileEntry, LocalSession, Session};
use tokio::io::{AsyncRead, AsyncWrite};

/// Session that serves a local directory tree but reports itself as a
/// remote endpoint, so relay and engine guards can be exercised without a
/// live SSH server. Paths stay POSIX-style, matching the remote
/// addressing convention on the platforms the tests run on.
pub struct RemoteStub {
    inner: LocalSession,
}

impl RemoteStub {
    pub fn new() -> Self {
        Self {
            inner: LocalSession::new(),
        }
    }
}

#[async_trait]
impl Session for RemoteStub {
    fn kind(&self) -> EndpointKind {
        EndpointKind::Remote
    }

    async fn list(&self, path: &str) -> Result<Vec<FileEntry>, FerryError> {
        self.inner.list(path).await
    }

    async fn stat(&self, path: &str) -> Result<FileEntry, FerryError> {
        self.inner.stat(path).await
    }

    async fn mkdir(&self, path: &str) -> Result<(), FerryError> {
        self.inner.mkdir(path).await
    }

    async fn remove(&self, path: &str) -> Result<(), FerryError> {
        self.inner.remove(path).await
    }

    async fn rmdir(&self, path: &str) -> Result<(), FerryError> {
        self.inner.rmdir(path).await
    }

    async fn open_read(
        &self,
        path: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, FerryError> {
        self.inner.open_read(path).await
    }

    async fn open_write(
        &self,
        path: &str,
    ) -> Result<Box<dyn AsyncWrite + Send + Unpin>, FerryError> {
        self.inner.open_write(path).await
    }

    async fn disconnect(&mut self) {}
}

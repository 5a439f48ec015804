//! Remote filesystem session over SSH/SFTP.

use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use russh::client;
use russh::keys::PublicKey;
use russh::Disconnect;
use russh_sftp::client::SftpSession;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use super::{EndpointKind, EntryKind, FileEntry, Session};
use crate::config::RemoteConfig;
use crate::error::FerryError;

/// Session over one SSH connection with the SFTP subsystem open.
///
/// Created by [`RemoteSession::connect`]; a failed connect never hands back
/// a half-open session. `disconnect` is idempotent.
pub struct RemoteSession {
    sftp: SftpSession,
    handle: Option<client::Handle<AcceptingHandler>>,
    host: String,
    start_path: String,
}

impl RemoteSession {
    /// Connect, authenticate with the resolved credentials, and open the
    /// SFTP subsystem. The whole TCP/handshake phase is bounded by the
    /// configured connect timeout.
    pub async fn connect(config: &RemoteConfig) -> Result<Self, FerryError> {
        let addr = format!("{}:{}", config.host, config.port);
        info!("connecting to {}", addr);

        let socket_addr = addr
            .to_socket_addrs()
            .map_err(|e| FerryError::Network(format!("failed to resolve {}: {}", addr, e)))?
            .next()
            .ok_or_else(|| FerryError::Network(format!("no address found for {}", addr)))?;

        let ssh_config = client::Config {
            keepalive_interval: Some(Duration::from_secs(30)),
            keepalive_max: 3,
            ..Default::default()
        };

        let mut handle = tokio::time::timeout(
            Duration::from_secs(config.timeout_secs),
            client::connect(Arc::new(ssh_config), socket_addr, AcceptingHandler),
        )
        .await
        .map_err(|_| FerryError::Timeout(addr.clone()))?
        .map_err(|e| FerryError::Network(e.to_string()))?;

        debug!("SSH handshake completed with {}", addr);

        let authenticated = handle
            .authenticate_password(&config.user, &config.secret)
            .await
            .map_err(|e| FerryError::Auth(e.to_string()))?;
        if !authenticated.success() {
            // Drop the half-open connection before surfacing the failure.
            let _ = handle
                .disconnect(Disconnect::ByApplication, "", "English")
                .await;
            return Err(FerryError::Auth(
                "authentication rejected by server".to_string(),
            ));
        }

        let channel = handle
            .channel_open_session()
            .await
            .map_err(|e| FerryError::Network(e.to_string()))?;
        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(|e| FerryError::Network(format!("SFTP subsystem unavailable: {}", e)))?;
        let sftp = SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| FerryError::Network(e.to_string()))?;

        info!("connected to {} as {}", addr, config.user);

        Ok(Self {
            sftp,
            handle: Some(handle),
            host: config.host.clone(),
            start_path: config.start_path.clone(),
        })
    }

    /// Directory the caller should list first after connecting.
    pub fn start_path(&self) -> &str {
        &self.start_path
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl Session for RemoteSession {
    fn kind(&self) -> EndpointKind {
        EndpointKind::Remote
    }

    async fn list(&self, path: &str) -> Result<Vec<FileEntry>, FerryError> {
        debug!("listing remote directory {}", path);
        let read_dir = self
            .sftp
            .read_dir(path)
            .await
            .map_err(|e| FerryError::from_sftp(path, e))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let name = entry.file_name();
            if name == "." || name == ".." {
                continue;
            }
            let metadata = entry.metadata();
            // The endpoint's word on entry type is final; anything that is
            // not a directory transfers as a file.
            let kind = if metadata.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let modified_at = metadata
                .mtime
                .and_then(|t| DateTime::from_timestamp(t as i64, 0))
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
        let metadata = self
            .sftp
            .metadata(path)
            .await
            .map_err(|e| FerryError::from_sftp(path, e))?;
        let name = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Ok(FileEntry {
            name,
            kind: if metadata.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            modified_at: metadata
                .mtime
                .and_then(|t| DateTime::from_timestamp(t as i64, 0))
                .unwrap_or(DateTime::UNIX_EPOCH),
        })
    }

    async fn mkdir(&self, path: &str) -> Result<(), FerryError> {
        debug!("creating remote directory {}", path);
        self.sftp
            .create_dir(path)
            .await
            .map_err(|e| FerryError::from_sftp(path, e))
    }

    async fn remove(&self, path: &str) -> Result<(), FerryError> {
        self.sftp
            .remove_file(path)
            .await
            .map_err(|e| FerryError::from_sftp(path, e))
    }

    async fn rmdir(&self, path: &str) -> Result<(), FerryError> {
        self.sftp
            .remove_dir(path)
            .await
            .map_err(|e| FerryError::from_sftp(path, e))
    }

    async fn open_read(
        &self,
        path: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, FerryError> {
        let file = self
            .sftp
            .open(path)
            .await
            .map_err(|e| FerryError::from_sftp(path, e))?;
        Ok(Box::new(file))
    }

    async fn open_write(
        &self,
        path: &str,
    ) -> Result<Box<dyn AsyncWrite + Send + Unpin>, FerryError> {
        let file = self
            .sftp
            .create(path)
            .await
            .map_err(|e| FerryError::from_sftp(path, e))?;
        Ok(Box::new(file))
    }

    async fn disconnect(&mut self) {
        if let Some(handle) = self.handle.take() {
            info!("disconnecting from {}", self.host);
            if let Err(e) = self.sftp.close().await {
                warn!("SFTP close failed for {}: {}", self.host, e);
            }
            let _ = handle
                .disconnect(Disconnect::ByApplication, "", "English")
                .await;
        }
    }
}

/// russh client callbacks.
///
/// Host-key trust policy lives outside the core: the server key is
/// accepted, matching the original auto-accept behavior of the tool this
/// engine serves.
struct AcceptingHandler;

impl client::Handler for AcceptingHandler {
    type Error = FerryError;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

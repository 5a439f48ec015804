//! Error types for sessions, listings, and transfers.

use thiserror::Error;

/// Errors surfaced by sessions and the transfer engine.
///
/// Connect-phase failures map to [`Auth`](FerryError::Auth),
/// [`Network`](FerryError::Network) or [`Timeout`](FerryError::Timeout);
/// per-entry failures carry the offending path so callers can name the
/// entry in user-facing messages.
#[derive(Error, Debug)]
pub enum FerryError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("connection to {0} timed out")]
    Timeout(String),

    #[error("{path}: {reason}")]
    Path { path: String, reason: String },

    #[error("access denied: {path}")]
    Access { path: String },

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl FerryError {
    /// Classify a local filesystem error against `path`.
    pub fn from_io(path: &str, err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::NotFound => FerryError::Path {
                path: path.to_string(),
                reason: "no such file or directory".to_string(),
            },
            ErrorKind::PermissionDenied => FerryError::Access {
                path: path.to_string(),
            },
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected => FerryError::Network(err.to_string()),
            _ => FerryError::Io {
                path: path.to_string(),
                reason: err.to_string(),
            },
        }
    }

    /// Classify an SFTP protocol error against `path`.
    ///
    /// The SFTP status text is the only portable signal for the common
    /// cases, so classification matches on it.
    pub fn from_sftp(path: &str, err: russh_sftp::client::error::Error) -> Self {
        let text = err.to_string();
        if text.contains("No such file") || text.contains("not found") {
            FerryError::Path {
                path: path.to_string(),
                reason: "no such file or directory".to_string(),
            }
        } else if text.contains("Permission denied") || text.contains("permission") {
            FerryError::Access {
                path: path.to_string(),
            }
        } else {
            FerryError::Io {
                path: path.to_string(),
                reason: text,
            }
        }
    }

    /// Stream-level read/write failure mid-transfer.
    pub fn stream(path: &str, err: std::io::Error) -> Self {
        FerryError::Io {
            path: path.to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<russh::Error> for FerryError {
    fn from(err: russh::Error) -> Self {
        FerryError::Network(err.to_string())
    }
}

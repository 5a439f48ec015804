//! Remote connection configuration.

use serde::{Deserialize, Serialize};

/// Resolved connection parameters for one remote endpoint.
///
/// This is the record the engine consumes; where it came from (profile
/// store, UI form, environment) is the caller's business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Remote host address
    pub host: String,

    /// SSH port (default: 22)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username for authentication
    pub user: String,

    /// Password for authentication
    pub secret: String,

    /// Directory shown after connecting (default: `/`)
    #[serde(default = "default_start_path")]
    pub start_path: String,

    /// Connect timeout in seconds (default: 5)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// Display form used in profile listings: `user@host:port`.
    pub fn display_name(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }

    /// Filesystem-safe profile key: `user@host_port`.
    pub fn file_stem(&self) -> String {
        format!("{}@{}_{}", self.user, self.host, self.port)
    }
}

fn default_port() -> u16 {
    22
}

fn default_start_path() -> String {
    "/".to_string()
}

fn default_timeout() -> u64 {
    5
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 22,
            user: String::new(),
            secret: String::new(),
            start_path: default_start_path(),
            timeout_secs: default_timeout(),
        }
    }
}

//! Connection profile persistence.
//!
//! One JSON file per profile, named `{user}@{host}_{port}.json`, in a
//! directory owned by the store. The engine itself never touches profiles;
//! it only consumes the resolved [`RemoteConfig`] a caller hands it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::RemoteConfig;
use crate::error::FerryError;

/// Stores and retrieves saved connection profiles.
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    /// Store rooted at an explicit directory (used by tests and callers
    /// with their own layout).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the per-user config directory.
    pub fn default_location() -> Result<Self, FerryError> {
        let base = dirs::config_dir().ok_or_else(|| FerryError::Io {
            path: "~".to_string(),
            reason: "no user config directory available".to_string(),
        })?;
        Ok(Self::new(base.join("ferryfs").join("profiles")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, file_stem: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem))
    }

    /// Save a profile, creating the store directory if needed. An existing
    /// profile with the same key is overwritten.
    pub fn save(&self, profile: &RemoteConfig) -> Result<(), FerryError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| FerryError::from_io(&self.dir.to_string_lossy(), e))?;
        let path = self.path_for(&profile.file_stem());
        let body = serde_json::to_string_pretty(profile).map_err(|e| FerryError::Io {
            path: path.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&path, body).map_err(|e| FerryError::from_io(&path.to_string_lossy(), e))
    }

    /// Load one profile by its file stem (`user@host_port`).
    pub fn load(&self, file_stem: &str) -> Result<RemoteConfig, FerryError> {
        let path = self.path_for(file_stem);
        let body =
            fs::read_to_string(&path).map_err(|e| FerryError::from_io(&path.to_string_lossy(), e))?;
        serde_json::from_str(&body).map_err(|e| FerryError::Io {
            path: path.to_string_lossy().to_string(),
            reason: format!("malformed profile: {}", e),
        })
    }

    /// Delete one profile. Removing a profile that does not exist is an
    /// error so the caller can tell the user.
    pub fn remove(&self, file_stem: &str) -> Result<(), FerryError> {
        let path = self.path_for(file_stem);
        fs::remove_file(&path).map_err(|e| FerryError::from_io(&path.to_string_lossy(), e))
    }

    /// All readable profiles, sorted by file name. Unreadable or malformed
    /// files are skipped with a warning rather than failing the listing.
    pub fn list(&self) -> Result<Vec<RemoteConfig>, FerryError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(FerryError::from_io(&self.dir.to_string_lossy(), e)),
        };

        let mut names: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect();
        names.sort();

        let mut profiles = Vec::new();
        for path in names {
            match fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|body| serde_json::from_str(&body).map_err(|e| e.to_string()))
            {
                Ok(profile) => profiles.push(profile),
                Err(e) => warn!("skipping unreadable profile {}: {}", path.display(), e),
            }
        }
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(host: &str, user: &str) -> RemoteConfig {
        RemoteConfig {
            host: host.into(),
            user: user.into(),
            secret: "hunter2".into(),
            start_path: "/home".into(),
            ..Default::default()
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        let profile = sample("db01", "ops");
        store.save(&profile).unwrap();

        let loaded = store.load("ops@db01_22").unwrap();
        assert_eq!(loaded.host, "db01");
        assert_eq!(loaded.user, "ops");
        assert_eq!(loaded.secret, "hunter2");
        assert_eq!(loaded.start_path, "/home");
    }

    #[test]
    fn list_is_sorted_and_skips_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        store.save(&sample("zeus", "a")).unwrap();
        store.save(&sample("atlas", "b")).unwrap();
        fs::write(dir.path().join("broken.json"), b"{ not json").unwrap();

        let profiles = store.list().unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].host, "zeus"); // a@zeus sorts before b@atlas
        assert_eq!(profiles[1].host, "atlas");
    }

    #[test]
    fn listing_a_missing_store_is_empty_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("never-created"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn remove_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        let profile = sample("box", "kim");
        store.save(&profile).unwrap();

        store.remove("kim@box_22").unwrap();
        assert!(store.load("kim@box_22").is_err());
        assert!(store.remove("kim@box_22").is_err());
    }
}

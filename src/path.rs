//! Endpoint-aware path joining and parent resolution.
//!
//! Local paths use the platform's native rules; remote paths always use
//! `/` regardless of either side's OS. Backslashes never reach a remote
//! endpoint.

use std::path::{Path, PathBuf};

use crate::session::EndpointKind;

/// Join `base` and a child entry `name` using the addressing convention
/// of the endpoint kind.
pub fn join(kind: EndpointKind, base: &str, name: &str) -> String {
    match kind {
        EndpointKind::Local => {
            let mut path = PathBuf::from(base);
            path.push(name);
            path.to_string_lossy().to_string()
        }
        EndpointKind::Remote => {
            let base = base.replace('\\', "/");
            if base.ends_with('/') {
                format!("{}{}", base, name)
            } else {
                format!("{}/{}", base, name)
            }
        }
    }
}

/// Parent directory of `path` on the given endpoint kind.
///
/// Going up from a filesystem root returns the root again rather than
/// erroring.
pub fn parent(kind: EndpointKind, path: &str) -> String {
    match kind {
        EndpointKind::Local => Path::new(path)
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string()),
        EndpointKind::Remote => {
            let path = path.replace('\\', "/");
            let trimmed = path.trim_end_matches('/');
            if trimmed.is_empty() {
                return "/".to_string();
            }
            match trimmed.rfind('/') {
                Some(0) => "/".to_string(),
                Some(idx) => trimmed[..idx].to_string(),
                None => "/".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_join_uses_forward_slash() {
        assert_eq!(join(EndpointKind::Remote, "/home", "file.txt"), "/home/file.txt");
        assert_eq!(join(EndpointKind::Remote, "/home/", "file.txt"), "/home/file.txt");
        assert_eq!(join(EndpointKind::Remote, "/", "home"), "/home");
    }

    #[test]
    fn remote_join_normalizes_backslashes_in_base() {
        assert_eq!(
            join(EndpointKind::Remote, "\\srv\\data", "a.bin"),
            "/srv/data/a.bin"
        );
    }

    #[test]
    fn remote_parent_walks_up_one_component() {
        assert_eq!(parent(EndpointKind::Remote, "/home/kim/docs"), "/home/kim");
        assert_eq!(parent(EndpointKind::Remote, "/home"), "/");
    }

    #[test]
    fn remote_parent_of_root_is_root() {
        assert_eq!(parent(EndpointKind::Remote, "/"), "/");
    }

    #[cfg(unix)]
    #[test]
    fn local_join_uses_platform_rules() {
        assert_eq!(join(EndpointKind::Local, "/home/kim", "file.txt"), "/home/kim/file.txt");
    }

    #[cfg(unix)]
    #[test]
    fn local_parent_of_root_is_unchanged() {
        assert_eq!(parent(EndpointKind::Local, "/"), "/");
        assert_eq!(parent(EndpointKind::Local, "/home/kim"), "/home");
    }
}

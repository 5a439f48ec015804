//! Remote-to-remote relays through a local staging directory.

mod common;

use chrono::Utc;
use ferryfs::{ChannelSink, EntryKind, FileEntry, LocalSession, RelayCoordinator, StatusLevel};
use std::path::Path;

fn entry(name: &str, kind: EntryKind) -> FileEntry {
    FileEntry {
        name: name.to_string(),
        kind,
        modified_at: Utc::now(),
    }
}

/// Pull the staging directory path out of the "staging through …" update.
fn staging_path(messages: &[String]) -> String {
    messages
        .iter()
        .find_map(|m| m.strip_prefix("staging through "))
        .expect("relay reported no staging path")
        .to_string()
}

#[tokio::test]
async fn relay_delivers_tree_and_removes_staging() {
    let src_dir = tempfile::tempdir().unwrap();
    let dst_dir = tempfile::tempdir().unwrap();
    tokio::fs::create_dir_all(src_dir.path().join("project/sub")).await.unwrap();
    tokio::fs::write(src_dir.path().join("project/a.txt"), b"alpha").await.unwrap();
    tokio::fs::write(src_dir.path().join("project/sub/b.txt"), b"beta").await.unwrap();

    let src = common::RemoteStub::new();
    let dst = common::RemoteStub::new();
    let (sink, mut rx) = ChannelSink::channel();
    let coordinator = RelayCoordinator::new(&sink);
    let delivered = coordinator
        .relay(
            &src,
            &src_dir.path().to_string_lossy(),
            &[entry("project", EntryKind::Directory)],
            &dst,
            &dst_dir.path().to_string_lossy(),
        )
        .await
        .unwrap();

    assert_eq!(delivered, 2);
    assert_eq!(
        tokio::fs::read(dst_dir.path().join("project/a.txt")).await.unwrap(),
        b"alpha"
    );
    assert_eq!(
        tokio::fs::read(dst_dir.path().join("project/sub/b.txt")).await.unwrap(),
        b"beta"
    );

    let messages: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
        .map(|u| u.message)
        .collect();
    assert!(!Path::new(&staging_path(&messages)).exists());
    assert!(messages.iter().any(|m| m.contains("relay complete")));
}

#[tokio::test]
async fn failed_relay_still_removes_staging() {
    let src_dir = tempfile::tempdir().unwrap();
    let dst_dir = tempfile::tempdir().unwrap();
    tokio::fs::write(src_dir.path().join("real.txt"), b"real").await.unwrap();

    let src = common::RemoteStub::new();
    let dst = common::RemoteStub::new();
    let (sink, mut rx) = ChannelSink::channel();
    let coordinator = RelayCoordinator::new(&sink);
    let err = coordinator
        .relay(
            &src,
            &src_dir.path().to_string_lossy(),
            &[
                entry("real.txt", EntryKind::File),
                entry("phantom.txt", EntryKind::File),
            ],
            &dst,
            &dst_dir.path().to_string_lossy(),
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("phantom.txt"));

    let messages: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
        .map(|u| u.message)
        .collect();
    assert!(!Path::new(&staging_path(&messages)).exists());
    // Nothing was uploaded: the first leg failed before the second began.
    assert!(!dst_dir.path().join("real.txt").exists());
}

#[tokio::test]
async fn relay_requires_two_remote_sessions() {
    let src_dir = tempfile::tempdir().unwrap();
    let dst_dir = tempfile::tempdir().unwrap();

    let local = LocalSession::new();
    let remote = common::RemoteStub::new();
    let (sink, _rx) = ChannelSink::channel();
    let coordinator = RelayCoordinator::new(&sink);
    let err = coordinator
        .relay(
            &local,
            &src_dir.path().to_string_lossy(),
            &[],
            &remote,
            &dst_dir.path().to_string_lossy(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ferryfs::FerryError::Unsupported(_)));
}

#[tokio::test]
async fn relay_of_multiple_selection_preserves_names() {
    let src_dir = tempfile::tempdir().unwrap();
    let dst_dir = tempfile::tempdir().unwrap();
    tokio::fs::write(src_dir.path().join("one.txt"), b"1").await.unwrap();
    tokio::fs::write(src_dir.path().join("two.txt"), b"2").await.unwrap();

    let src = common::RemoteStub::new();
    let dst = common::RemoteStub::new();
    let (sink, _rx) = ChannelSink::channel();
    let coordinator = RelayCoordinator::new(&sink);
    let delivered = coordinator
        .relay(
            &src,
            &src_dir.path().to_string_lossy(),
            &[
                entry("one.txt", EntryKind::File),
                entry("two.txt", EntryKind::File),
            ],
            &dst,
            &dst_dir.path().to_string_lossy(),
        )
        .await
        .unwrap();

    assert_eq!(delivered, 2);
    assert_eq!(tokio::fs::read(dst_dir.path().join("one.txt")).await.unwrap(), b"1");
    assert_eq!(tokio::fs::read(dst_dir.path().join("two.txt")).await.unwrap(), b"2");
}

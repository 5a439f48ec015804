//! Transfer engine: single files, whole trees, fail-fast batches.
//!
//! Copies stream through the source session's read primitive and the
//! destination session's write primitive, so every local/remote pairing
//! shares one implementation. Remote-to-remote pairs are rejected here and
//! must go through the relay coordinator.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::FerryError;
use crate::listing;
use crate::path;
use crate::progress::{ProgressSink, StatusLevel, StatusUpdate};
use crate::session::{EndpointKind, EntryKind, FileEntry, Session};

/// Read/write chunk size for streaming copies (64 KB).
const CHUNK_SIZE: usize = 64 * 1024;

/// One unit of transfer work: a single selected entry routed between two
/// endpoints. A batch submits one job per top-level entry; directories
/// expand internally while the job runs.
#[derive(Debug, Clone)]
pub struct TransferJob {
    pub source_endpoint: EndpointKind,
    pub source_path: String,
    pub dest_endpoint: EndpointKind,
    pub dest_path: String,
    pub kind: EntryKind,
}

/// One user-initiated transfer operation.
///
/// An engine instance carries the job id stamped on every status update it
/// emits. Operations are strictly sequential: within a batch or a tree walk
/// there is no parallel fan-out, and the first failure aborts the rest.
/// Already-copied entries are never rolled back.
pub struct TransferEngine<'a> {
    sink: &'a dyn ProgressSink,
    job: Uuid,
}

impl<'a> TransferEngine<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            job: Uuid::new_v4(),
        }
    }

    pub fn job(&self) -> Uuid {
        self.job
    }

    fn report(&self, level: StatusLevel, message: impl Into<String>) {
        self.sink.report(StatusUpdate {
            job: self.job,
            level,
            message: message.into(),
        });
    }

    /// Stream one file from `src_path` on `src` to `dst_path` on `dst`.
    ///
    /// Returns the number of bytes transferred. A mid-stream failure
    /// surfaces as an I/O error; no partial-file cleanup is attempted, so
    /// the destination may be left truncated.
    pub async fn copy_file(
        &self,
        src: &dyn Session,
        src_path: &str,
        dst: &dyn Session,
        dst_path: &str,
    ) -> Result<u64, FerryError> {
        reject_remote_pair(src, dst)?;
        debug!("copying file {} -> {}", src_path, dst_path);

        let mut reader = src.open_read(src_path).await?;
        let mut writer = dst.open_write(dst_path).await?;

        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut transferred = 0u64;
        loop {
            let n = reader
                .read(&mut buffer)
                .await
                .map_err(|e| FerryError::stream(src_path, e))?;
            if n == 0 {
                break;
            }
            writer
                .write_all(&buffer[..n])
                .await
                .map_err(|e| FerryError::stream(dst_path, e))?;
            transferred += n as u64;
        }
        writer
            .flush()
            .await
            .map_err(|e| FerryError::stream(dst_path, e))?;
        writer
            .shutdown()
            .await
            .map_err(|e| FerryError::stream(dst_path, e))?;

        debug!("copied {} bytes to {}", transferred, dst_path);
        Ok(transferred)
    }

    /// Recursively copy the tree rooted at `src_path` into `dst_path`.
    ///
    /// Pre-order, depth-first: the destination directory is created first
    /// (idempotently, so re-running into a partially populated destination
    /// resumes instead of aborting), then entries are processed in listing
    /// order. Returns the number of files copied.
    pub async fn copy_tree(
        &self,
        src: &dyn Session,
        src_path: &str,
        dst: &dyn Session,
        dst_path: &str,
    ) -> Result<u64, FerryError> {
        reject_remote_pair(src, dst)?;
        ensure_dir(dst, dst_path).await?;

        let entries = listing::list_dir(src, src_path).await?;
        let mut copied = 0u64;
        for entry in entries {
            let src_child = path::join(src.kind(), src_path, &entry.name);
            let dst_child = path::join(dst.kind(), dst_path, &entry.name);
            match entry.kind {
                EntryKind::Directory => {
                    copied +=
                        Box::pin(self.copy_tree(src, &src_child, dst, &dst_child)).await?;
                }
                EntryKind::File => {
                    self.report(StatusLevel::Working, format!("copying: {}", src_child));
                    self.copy_file(src, &src_child, dst, &dst_child).await?;
                    copied += 1;
                }
            }
        }
        Ok(copied)
    }

    /// Copy a selection of entries from `src_base` into `dst_base`.
    ///
    /// Entries are taken in the order given (listing order). The first
    /// failure aborts the remaining entries and is returned as-is;
    /// completed entries stay in place. Returns the number of files copied.
    pub async fn copy_batch(
        &self,
        src: &dyn Session,
        src_base: &str,
        entries: &[FileEntry],
        dst: &dyn Session,
        dst_base: &str,
    ) -> Result<u64, FerryError> {
        reject_remote_pair(src, dst)?;
        info!(
            "starting batch of {} entries: {} -> {}",
            entries.len(),
            src_base,
            dst_base
        );

        let mut copied = 0u64;
        for entry in entries {
            let job = TransferJob {
                source_endpoint: src.kind(),
                source_path: path::join(src.kind(), src_base, &entry.name),
                dest_endpoint: dst.kind(),
                dest_path: path::join(dst.kind(), dst_base, &entry.name),
                kind: entry.kind,
            };
            match self.run_job(src, dst, &job, &entry.name).await {
                Ok(n) => copied += n,
                Err(err) => {
                    self.report(
                        StatusLevel::Error,
                        format!("transfer failed: {}: {}", entry.name, err),
                    );
                    return Err(err);
                }
            }
        }

        self.report(
            StatusLevel::Success,
            format!("transfer complete ({} files)", copied),
        );
        Ok(copied)
    }

    /// Dispatch one job to the matching primitive. Returns the number of
    /// files copied.
    async fn run_job(
        &self,
        src: &dyn Session,
        dst: &dyn Session,
        job: &TransferJob,
        entry_name: &str,
    ) -> Result<u64, FerryError> {
        match job.kind {
            EntryKind::Directory => {
                self.report(
                    StatusLevel::Working,
                    format!("copying folder: {}", entry_name),
                );
                self.copy_tree(src, &job.source_path, dst, &job.dest_path)
                    .await
            }
            EntryKind::File => {
                self.report(StatusLevel::Working, format!("copying: {}", entry_name));
                self.copy_file(src, &job.source_path, dst, &job.dest_path)
                    .await
                    .map(|_| 1)
            }
        }
    }

    /// Remove one selected entry: a file directly, a directory recursively.
    pub async fn remove_entry(
        &self,
        session: &dyn Session,
        base: &str,
        entry: &FileEntry,
    ) -> Result<u64, FerryError> {
        let target = path::join(session.kind(), base, &entry.name);
        match entry.kind {
            EntryKind::Directory => self.remove_tree(session, &target).await,
            EntryKind::File => {
                session.remove(&target).await?;
                Ok(1)
            }
        }
    }

    /// Recursively delete the tree rooted at `target`.
    ///
    /// Post-order: files first, then each emptied directory. Returns the
    /// number of entries removed.
    pub async fn remove_tree(
        &self,
        session: &dyn Session,
        target: &str,
    ) -> Result<u64, FerryError> {
        let entries = listing::list_dir(session, target).await?;
        let mut removed = 0u64;
        for entry in entries {
            let child = path::join(session.kind(), target, &entry.name);
            match entry.kind {
                EntryKind::Directory => {
                    removed += Box::pin(self.remove_tree(session, &child)).await?;
                }
                EntryKind::File => {
                    session.remove(&child).await?;
                    removed += 1;
                }
            }
        }
        session.rmdir(target).await?;
        Ok(removed + 1)
    }

    /// Delete a selection of entries, fail-fast like [`copy_batch`]:
    /// the first failure aborts the remainder; already-deleted entries stay
    /// deleted.
    ///
    /// [`copy_batch`]: TransferEngine::copy_batch
    pub async fn remove_batch(
        &self,
        session: &dyn Session,
        base: &str,
        entries: &[FileEntry],
    ) -> Result<u64, FerryError> {
        let mut removed = 0u64;
        for entry in entries {
            self.report(StatusLevel::Working, format!("deleting: {}", entry.name));
            match self.remove_entry(session, base, entry).await {
                Ok(n) => removed += n,
                Err(err) => {
                    self.report(
                        StatusLevel::Error,
                        format!("delete failed: {}: {}", entry.name, err),
                    );
                    return Err(err);
                }
            }
        }
        self.report(
            StatusLevel::Success,
            format!("deleted {} entries", removed),
        );
        Ok(removed)
    }
}

/// Create `path` on `session`, treating "already exists" as success.
///
/// A failed mkdir is forgiven only when a follow-up stat shows a directory
/// at that path; anything else propagates the original error.
pub async fn ensure_dir(session: &dyn Session, path: &str) -> Result<(), FerryError> {
    match session.mkdir(path).await {
        Ok(()) => Ok(()),
        Err(err) => match session.stat(path).await {
            Ok(entry) if entry.kind == EntryKind::Directory => {
                debug!("directory {} already exists", path);
                Ok(())
            }
            _ => {
                warn!("mkdir {} failed: {}", path, err);
                Err(err)
            }
        },
    }
}

fn reject_remote_pair(src: &dyn Session, dst: &dyn Session) -> Result<(), FerryError> {
    if src.kind() == EndpointKind::Remote && dst.kind() == EndpointKind::Remote {
        return Err(FerryError::Unsupported(
            "remote-to-remote copies must be staged through a relay".to_string(),
        ));
    }
    Ok(())
}

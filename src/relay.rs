//! Remote-to-remote transfers staged through a local directory.
//!
//! No direct byte path exists between two remote endpoints, so a relay
//! downloads the selection into a private staging directory and uploads it
//! from there. The staging directory lives exactly as long as the relay
//! call and is removed on every exit path.

use tracing::{info, warn};

use crate::error::FerryError;
use crate::listing;
use crate::progress::{ProgressSink, StatusLevel, StatusUpdate};
use crate::session::{EndpointKind, FileEntry, LocalSession, Session};
use crate::transfer::TransferEngine;

/// Coordinates one relay operation between two remote sessions.
pub struct RelayCoordinator<'a> {
    sink: &'a dyn ProgressSink,
}

impl<'a> RelayCoordinator<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink }
    }

    /// Relay `entries` from `src_base` on `src` to `dst_base` on `dst`.
    ///
    /// Both sessions must be remote. A failure in either leg aborts the
    /// remaining work and propagates, but staging cleanup still runs; a
    /// cleanup failure is reported, not retried, and does not fail an
    /// otherwise successful relay. Returns the number of files delivered
    /// to the destination.
    pub async fn relay(
        &self,
        src: &dyn Session,
        src_base: &str,
        entries: &[FileEntry],
        dst: &dyn Session,
        dst_base: &str,
    ) -> Result<u64, FerryError> {
        if src.kind() != EndpointKind::Remote || dst.kind() != EndpointKind::Remote {
            return Err(FerryError::Unsupported(
                "relay requires two remote sessions".to_string(),
            ));
        }

        let staging = tempfile::Builder::new()
            .prefix("ferryfs-stage-")
            .tempdir()
            .map_err(|e| FerryError::Io {
                path: std::env::temp_dir().to_string_lossy().to_string(),
                reason: format!("failed to create staging directory: {}", e),
            })?;
        let stage_base = staging.path().to_string_lossy().to_string();
        info!(
            "relaying {} entries via staging directory {}",
            entries.len(),
            stage_base
        );

        let engine = TransferEngine::new(self.sink);
        let report = |level: StatusLevel, message: String| {
            self.sink.report(StatusUpdate {
                job: engine.job(),
                level,
                message,
            });
        };
        report(
            StatusLevel::Working,
            format!("staging through {}", stage_base),
        );

        let local = LocalSession::new();
        let outcome = async {
            engine
                .copy_batch(src, src_base, entries, &local, &stage_base)
                .await?;
            let staged = listing::list_dir(&local, &stage_base).await?;
            engine
                .copy_batch(&local, &stage_base, &staged, dst, dst_base)
                .await
        }
        .await;

        // Cleanup runs whether the legs succeeded or not. The TempDir
        // would also remove itself on drop; closing explicitly lets a
        // cleanup failure be reported.
        if let Err(e) = staging.close() {
            warn!("failed to remove staging directory {}: {}", stage_base, e);
            report(
                StatusLevel::Error,
                format!("failed to remove staging directory {}: {}", stage_base, e),
            );
        }

        match outcome {
            Ok(delivered) => {
                report(
                    StatusLevel::Success,
                    format!("relay complete ({} files)", delivered),
                );
                Ok(delivered)
            }
            Err(err) => Err(err),
        }
    }
}

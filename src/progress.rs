//! Progress reporting for transfer operations.
//!
//! The engine produces human-readable status updates on a sink; only the
//! presentation layer decides how to render them. A background transfer
//! never touches UI state directly.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Severity of a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    /// Neutral information
    Info,
    /// An operation is underway
    Working,
    /// An operation finished successfully
    Success,
    /// An operation failed
    Error,
}

/// One human-readable status message from a transfer job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Job this update belongs to
    pub job: Uuid,
    pub level: StatusLevel,
    pub message: String,
}

/// Receives status updates from the engine.
///
/// Implementations must be cheap and non-blocking; the engine calls
/// `report` from inside its transfer loop.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: StatusUpdate);
}

/// Sink that forwards updates onto an unbounded channel.
///
/// The receiving half lives on the presentation side; a dropped receiver
/// silently discards further updates rather than failing the transfer.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StatusUpdate>,
}

impl ChannelSink {
    /// Create a sink plus the receiver the caller drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StatusUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn report(&self, update: StatusUpdate) {
        let _ = self.tx.send(update);
    }
}

/// Sink that discards everything.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _update: StatusUpdate) {}
}

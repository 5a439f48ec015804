//! ferryfs — transfer orchestration between local and SSH remote filesystems.
//!
//! The crate provides the engine behind a dual-pane file browser: uniform
//! directory listings across endpoints, recursive tree copies between any
//! local/remote pairing, and remote-to-remote relays staged through an
//! ephemeral local directory. Presentation, confirmation prompts, and
//! host-key trust policy all live outside this crate; it reports progress
//! through a [`ProgressSink`] and consumes resolved connection parameters.

pub mod config;
pub mod error;
pub mod listing;
pub mod path;
pub mod profile;
pub mod progress;
pub mod relay;
pub mod session;
pub mod transfer;

pub use config::RemoteConfig;
pub use error::FerryError;
pub use profile::ProfileStore;
pub use progress::{ChannelSink, NullSink, ProgressSink, StatusLevel, StatusUpdate};
pub use relay::RelayCoordinator;
pub use session::{
    EndpointKind, EntryKind, FileEntry, LocalSession, RemoteSession, Session, SessionRegistry,
};
pub use transfer::{TransferEngine, TransferJob};

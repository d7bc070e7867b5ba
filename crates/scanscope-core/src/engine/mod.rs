/// Engine protocol: everything exchanged with the external scan engine and
/// the disk-usage query service.
///
/// Both collaborators are asynchronous: a call returns immediately and the
/// answer arrives later as an [`Inbound`] message on the controller's single
/// ordered channel, interleaved with the engine's own notifications. The
/// controller is the only consumer of that channel.
pub mod notification;

pub use notification::{FsChange, FsChangeKind, NotificationClass, ScanSnapshot, SessionId};

use crate::usage::DiskOverview;
use crate::{CoreError, Result};
use crossbeam_channel::Sender;
use thiserror::Error;

/// Engine event name for a running progress snapshot.
pub const EVENT_PROGRESS: &str = "scan_progress";
/// Engine event name for the terminal snapshot of a session.
pub const EVENT_COMPLETE: &str = "scan_complete";
/// Engine event name for a post-scan filesystem change.
pub const EVENT_FS_CHANGE: &str = "scan_fs_change";

/// Client-issued token matching a start request to its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StartTicket(pub u64);

/// Client-issued, monotonically increasing disk-usage request id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// Failure reported by the scan engine or the usage service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{0}")]
    Rejected(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Every message the controller consumes, in arrival order.
#[derive(Debug, Clone)]
pub enum Inbound {
    /// Periodic snapshot for a running session.
    Progress(ScanSnapshot),
    /// Final snapshot for a session.
    Complete(ScanSnapshot),
    /// Filesystem change under a completed session's root.
    FsChange(FsChange),
    /// Answer to [`ScanEngine::start_scan`].
    StartReply {
        ticket: StartTicket,
        result: std::result::Result<SessionId, EngineError>,
    },
    /// Answer to [`ScanEngine::cancel_scan`].
    CancelReply {
        id: SessionId,
        result: std::result::Result<bool, EngineError>,
    },
    /// Answer to [`UsageService::disk_overview`].
    UsageReply {
        request_id: RequestId,
        result: std::result::Result<DiskOverview, EngineError>,
    },
}

/// The external scanning engine.
///
/// Implementations must not block: work happens elsewhere and the outcome
/// is posted to `reply`.
pub trait ScanEngine {
    /// Begin scanning `root`. Answers with [`Inbound::StartReply`] carrying
    /// `ticket` and the engine-issued session id.
    fn start_scan(&self, ticket: StartTicket, root: &str, reply: Sender<Inbound>);

    /// Stop session `id`. Answers with [`Inbound::CancelReply`].
    fn cancel_scan(&self, id: SessionId, reply: Sender<Inbound>);
}

/// The external disk-usage query service.
pub trait UsageService {
    /// Look up the volume holding `root`. Answers with [`Inbound::UsageReply`]
    /// carrying `request_id`.
    fn disk_overview(&self, request_id: RequestId, root: &str, reply: Sender<Inbound>);
}

/// Decode a raw engine event (name + JSON payload) into an [`Inbound`] message.
pub fn decode_event(name: &str, payload: &str) -> Result<Inbound> {
    let message = match name {
        EVENT_PROGRESS => Inbound::Progress(serde_json::from_str(payload)?),
        EVENT_COMPLETE => Inbound::Complete(serde_json::from_str(payload)?),
        EVENT_FS_CHANGE => Inbound::FsChange(serde_json::from_str(payload)?),
        other => return Err(CoreError::UnknownEvent(other.to_string())),
    };
    Ok(message)
}

/// Notifications emitted by the scan engine.
///
/// Every notification carries the identity of the session that produced it.
/// Field names on the wire are the engine's camelCase; `sessionId` is
/// accepted as an alias of `scanId`.
use crate::model::FileEntry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, engine-issued identity of one scan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Running totals plus the engine's current top-N list.
///
/// Used for both `scan_progress` and the terminal `scan_complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSnapshot {
    #[serde(rename = "scanId", alias = "sessionId")]
    pub session_id: SessionId,
    pub scanned_files: u64,
    pub scanned_bytes: u64,
    #[serde(default)]
    pub current_path: String,
    #[serde(default)]
    pub top_files: Vec<FileEntry>,
}

/// What happened to a path after the scan finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FsChangeKind {
    Create,
    Modify,
    Remove,
}

/// A filesystem change observed under the scanned root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsChange {
    #[serde(rename = "scanId", alias = "sessionId")]
    pub session_id: SessionId,
    pub path: String,
    pub kind: FsChangeKind,
    /// New size for create/modify; the engine omits it for removals and
    /// for paths it could not stat.
    #[serde(default)]
    pub size: Option<u64>,
}

/// Admission class of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationClass {
    /// Running progress snapshot.
    Progress,
    /// Terminal snapshot for the session.
    Completion,
    /// Post-completion filesystem change.
    Change,
}

impl NotificationClass {
    /// Progress and completion share the in-progress admission rules.
    pub fn is_progress_class(self) -> bool {
        matches!(self, Self::Progress | Self::Completion)
    }
}

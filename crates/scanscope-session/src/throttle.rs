/// Disk-usage refresh throttling.
///
/// Usage queries are comparatively slow and their answer rarely changes
/// between two events, so non-forced requests are limited to one in flight
/// and one per `min_interval`. Each issued request gets a fresh id; only the
/// answer carrying the latest id is applied, so a slow stale answer can
/// never overwrite a newer one.
use scanscope_core::engine::RequestId;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Why a refresh was requested. Logged only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// The selected path settled on a new value.
    PathChanged,
    /// Files were created or removed under the scanned root.
    FsChange,
    /// A scan just finished.
    ScanComplete,
    /// The user asked for it.
    Manual,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::PathChanged => "path changed",
            Self::FsChange => "filesystem change",
            Self::ScanComplete => "scan complete",
            Self::Manual => "manual",
        };
        f.write_str(label)
    }
}

/// An issued query: the caller sends it to the usage service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    pub id: RequestId,
    pub path: String,
}

#[derive(Debug)]
pub struct RefreshThrottler {
    path: String,
    min_interval: Duration,
    last_request_at: Option<Instant>,
    current_request_id: u64,
    in_flight: bool,
}

impl RefreshThrottler {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            path: String::new(),
            min_interval,
            last_request_at: None,
            current_request_id: 0,
            in_flight: false,
        }
    }

    /// The path queries are made for.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Point the throttler at a new path.
    ///
    /// A different path invalidates any outstanding request and resets the
    /// interval guard: the previous path's answer must not land on the new
    /// one, and the first query for the new path must not be suppressed.
    /// Returns `true` if the path changed.
    pub fn set_path(&mut self, path: &str) -> bool {
        let path = path.trim();
        if path == self.path {
            return false;
        }
        self.path = path.to_string();
        self.current_request_id += 1;
        self.in_flight = false;
        self.last_request_at = None;
        true
    }

    /// Issue a query unless it is throttled.
    ///
    /// `force` skips the in-flight and interval guards; the empty-path guard
    /// and the latest-answer-wins rule still apply.
    pub fn request(
        &mut self,
        reason: RefreshReason,
        detail: &str,
        force: bool,
        now: Instant,
    ) -> Option<RefreshTicket> {
        if self.path.is_empty() {
            return None;
        }
        if !force {
            if self.in_flight {
                debug!("Usage: {} refresh skipped, request in flight", reason);
                return None;
            }
            if let Some(last) = self.last_request_at {
                if now.saturating_duration_since(last) < self.min_interval {
                    debug!("Usage: {} refresh skipped, last request too recent", reason);
                    return None;
                }
            }
        }

        self.current_request_id += 1;
        self.in_flight = true;
        self.last_request_at = Some(now);
        info!(
            "Usage: refreshing {} ({}{}{})",
            self.path,
            reason,
            if detail.is_empty() { "" } else { ": " },
            detail
        );
        Some(RefreshTicket {
            id: RequestId(self.current_request_id),
            path: self.path.clone(),
        })
    }

    /// Accept an answer for request `id`. Returns `false` for superseded ids.
    pub fn resolve(&mut self, id: RequestId) -> bool {
        if id.0 != self.current_request_id {
            debug!("Usage: discarding superseded answer {:?}", id);
            return false;
        }
        self.in_flight = false;
        true
    }
}

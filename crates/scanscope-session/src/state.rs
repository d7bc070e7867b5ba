/// Presentation state.
///
/// Everything the UI reads besides the session phase and the ledger:
/// progress counters, the live largest-files list, and the disk-usage panel.
/// Only [`crate::SessionController`] writes to it, and only after a
/// notification has passed admission.
use scanscope_core::engine::ScanSnapshot;
use scanscope_core::model::TopFiles;
use scanscope_core::usage::DiskOverview;

pub struct AppState {
    // ── Scan ───────────────────────────────────────────
    pub scanned_files: u64,
    pub scanned_bytes: u64,
    pub current_path: String,
    /// Largest files of the current session.
    pub top_files: TopFiles,
    /// Last user-visible failure (e.g. the engine refused to start).
    pub error_message: Option<String>,

    // ── Disk usage ─────────────────────────────────────
    /// Root the disk-usage panel describes.
    pub selected_path: String,
    /// Latest successful answer for `selected_path`.
    pub overview: Option<DiskOverview>,
    pub overview_loading: bool,
    pub overview_error: Option<String>,
}

impl AppState {
    /// Empty state with a largest-files list of `top_n` entries.
    pub fn new(top_n: usize) -> Self {
        Self {
            scanned_files: 0,
            scanned_bytes: 0,
            current_path: String::new(),
            top_files: TopFiles::with_capacity(top_n),
            error_message: None,
            selected_path: String::new(),
            overview: None,
            overview_loading: false,
            overview_error: None,
        }
    }

    /// Baseline for a freshly started scan of `root`.
    pub fn reset_for_scan(&mut self, root: &str) {
        self.scanned_files = 0;
        self.scanned_bytes = 0;
        self.current_path = root.to_string();
        self.top_files.clear();
        self.error_message = None;
    }

    /// Take over an admitted snapshot. No merging across snapshots.
    pub fn apply_snapshot(&mut self, snapshot: ScanSnapshot) {
        self.scanned_files = snapshot.scanned_files;
        self.scanned_bytes = snapshot.scanned_bytes;
        if !snapshot.current_path.is_empty() {
            self.current_path = snapshot.current_path;
        }
        self.top_files.apply_snapshot(snapshot.top_files);
    }

    /// Point the usage panel at `path`, dropping the previous root's figures.
    pub fn select_path(&mut self, path: &str) {
        self.selected_path = path.to_string();
        self.overview = None;
        self.overview_loading = false;
        self.overview_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanscope_core::engine::SessionId;
    use scanscope_core::model::FileEntry;

    fn snapshot(files: u64, current: &str) -> ScanSnapshot {
        ScanSnapshot {
            session_id: SessionId(1),
            scanned_files: files,
            scanned_bytes: files * 100,
            current_path: current.to_string(),
            top_files: vec![FileEntry::new("/r/a", 300), FileEntry::new("/r/b", 200)],
        }
    }

    #[test]
    fn snapshot_replaces_counters_and_list() {
        let mut state = AppState::new(50);
        state.apply_snapshot(snapshot(10, "/r/sub"));
        assert_eq!(state.scanned_files, 10);
        assert_eq!(state.scanned_bytes, 1000);
        assert_eq!(state.current_path, "/r/sub");
        assert_eq!(state.top_files.len(), 2);
    }

    #[test]
    fn snapshot_without_current_path_keeps_previous() {
        let mut state = AppState::new(50);
        state.apply_snapshot(snapshot(1, "/r/sub"));
        state.apply_snapshot(snapshot(2, ""));
        assert_eq!(state.current_path, "/r/sub");
    }

    #[test]
    fn reset_returns_to_baseline() {
        let mut state = AppState::new(50);
        state.apply_snapshot(snapshot(10, "/r/sub"));
        state.error_message = Some("boom".into());
        state.reset_for_scan("/next");
        assert_eq!(state.scanned_files, 0);
        assert_eq!(state.scanned_bytes, 0);
        assert_eq!(state.current_path, "/next");
        assert!(state.top_files.is_empty());
        assert!(state.error_message.is_none());
    }

    #[test]
    fn selecting_path_clears_previous_overview() {
        let mut state = AppState::new(50);
        state.overview = Some(DiskOverview::from_space("/a", None, None, 10, 5));
        state.overview_error = Some("old".into());
        state.select_path("/b");
        assert_eq!(state.selected_path, "/b");
        assert!(state.overview.is_none());
        assert!(state.overview_error.is_none());
    }
}

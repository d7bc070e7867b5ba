/// Top-N largest files tracker.
///
/// Holds the bounded, size-ordered list of the largest known files for the
/// active scan session. During a scan the engine sends its authoritative
/// list with every snapshot and the tracker is replaced wholesale; once the
/// scan has completed, filesystem change events are folded in one at a time
/// using only what the list itself knows.
use crate::engine::{FsChange, FsChangeKind};
use crate::model::FileEntry;
use std::collections::HashSet;
use tracing::debug;

/// Capacity of the largest-files list when none is configured.
pub const DEFAULT_TOP_N: usize = 50;

/// What [`TopFiles::apply_change`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// A new path entered the list.
    Inserted,
    /// An existing path changed size.
    Updated,
    /// This many entries were removed.
    Removed(usize),
    /// The size is too small to displace anything in a full list.
    Rejected,
    /// Create/modify without a usable size.
    Ignored,
    /// The event matched nothing, or changed nothing.
    Unchanged,
}

impl ChangeOutcome {
    /// `true` if the visible list was mutated.
    pub fn changed(self) -> bool {
        matches!(self, Self::Inserted | Self::Updated | Self::Removed(_))
    }
}

/// Bounded list of the largest files, sorted by size descending.
#[derive(Debug, Clone)]
pub struct TopFiles {
    entries: Vec<FileEntry>,
    capacity: usize,
}

impl Default for TopFiles {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TOP_N)
    }
}

impl TopFiles {
    /// Create an empty tracker. A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Entries in rank order (largest first).
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Size of the smallest retained entry, if any.
    pub fn min_size(&self) -> Option<u64> {
        self.entries.last().map(|e| e.size)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the whole list with an engine snapshot.
    ///
    /// A path listed more than once keeps only its largest size.
    pub fn apply_snapshot(&mut self, entries: Vec<FileEntry>) {
        self.entries = entries;
        self.entries.sort_by(|a, b| b.size.cmp(&a.size));
        let mut seen = HashSet::with_capacity(self.entries.len());
        self.entries.retain(|e| seen.insert(e.path.clone()));
        self.entries.truncate(self.capacity);
    }

    /// Fold one filesystem change into the list.
    pub fn apply_change(&mut self, change: &FsChange) -> ChangeOutcome {
        match change.kind {
            FsChangeKind::Remove => self.remove_at_or_under(&change.path),
            FsChangeKind::Create | FsChangeKind::Modify => match change.size {
                Some(size) if size > 0 => self.upsert(&change.path, size),
                _ => ChangeOutcome::Ignored,
            },
        }
    }

    /// Remove `path` and, reading it as a directory, everything under it.
    fn remove_at_or_under(&mut self, path: &str) -> ChangeOutcome {
        let before = self.entries.len();
        self.entries.retain(|e| !e.is_at_or_under(path));
        let removed = before - self.entries.len();
        if removed == 0 {
            return ChangeOutcome::Unchanged;
        }
        debug!("Top files: removed {} entries at or under {}", removed, path);
        ChangeOutcome::Removed(removed)
    }

    fn upsert(&mut self, path: &str, size: u64) -> ChangeOutcome {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.path == path) {
            if entry.size == size {
                return ChangeOutcome::Unchanged;
            }
            entry.size = size;
            self.normalise();
            return ChangeOutcome::Updated;
        }

        // A full list can only accept something strictly larger than its tail.
        if self.is_full() && self.min_size().is_some_and(|min| size <= min) {
            return ChangeOutcome::Rejected;
        }

        self.entries.push(FileEntry::new(path, size));
        self.normalise();
        ChangeOutcome::Inserted
    }

    /// Re-establish the ordering and capacity invariants.
    ///
    /// The sort is stable, so entries of equal size keep their relative
    /// order and unrelated rows do not shuffle on every event.
    fn normalise(&mut self) {
        self.entries.sort_by(|a, b| b.size.cmp(&a.size));
        self.entries.truncate(self.capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SessionId;

    fn change(kind: FsChangeKind, path: &str, size: Option<u64>) -> FsChange {
        FsChange {
            session_id: SessionId(1),
            path: path.to_string(),
            kind,
            size,
        }
    }

    fn tracker(capacity: usize, files: &[(&str, u64)]) -> TopFiles {
        let mut top = TopFiles::with_capacity(capacity);
        top.apply_snapshot(files.iter().map(|&(p, s)| FileEntry::new(p, s)).collect());
        top
    }

    fn sizes(top: &TopFiles) -> Vec<u64> {
        top.entries().iter().map(|e| e.size).collect()
    }

    /// A create no larger than the minimum of a full list is turned away.
    #[test]
    fn full_list_rejects_small_create() {
        let mut top = tracker(2, &[("/a", 100), ("/b", 50)]);
        let outcome = top.apply_change(&change(FsChangeKind::Create, "/c", Some(30)));
        assert_eq!(outcome, ChangeOutcome::Rejected);
        assert_eq!(sizes(&top), vec![100, 50]);
    }

    /// Equal to the minimum is still not an improvement.
    #[test]
    fn full_list_rejects_create_equal_to_minimum() {
        let mut top = tracker(2, &[("/a", 100), ("/b", 50)]);
        let outcome = top.apply_change(&change(FsChangeKind::Create, "/c", Some(50)));
        assert_eq!(outcome, ChangeOutcome::Rejected);
    }

    /// A larger create evicts the smallest entry.
    #[test]
    fn full_list_accepts_larger_create_and_evicts_tail() {
        let mut top = tracker(2, &[("/a", 100), ("/b", 50)]);
        let outcome = top.apply_change(&change(FsChangeKind::Create, "/c", Some(70)));
        assert_eq!(outcome, ChangeOutcome::Inserted);
        assert_eq!(sizes(&top), vec![100, 70]);
        assert!(top.entries().iter().all(|e| e.path != "/b"));
    }

    #[test]
    fn modify_existing_path_updates_in_place_and_resorts() {
        let mut top = tracker(3, &[("/a", 100), ("/b", 50), ("/c", 10)]);
        let outcome = top.apply_change(&change(FsChangeKind::Modify, "/c", Some(500)));
        assert_eq!(outcome, ChangeOutcome::Updated);
        assert_eq!(top.entries()[0].path, "/c");
        assert_eq!(top.len(), 3);
    }

    #[test]
    fn modify_with_same_size_is_unchanged() {
        let mut top = tracker(3, &[("/a", 100)]);
        let outcome = top.apply_change(&change(FsChangeKind::Modify, "/a", Some(100)));
        assert_eq!(outcome, ChangeOutcome::Unchanged);
        assert!(!outcome.changed());
    }

    #[test]
    fn create_without_size_is_ignored() {
        let mut top = tracker(3, &[("/a", 100)]);
        assert_eq!(
            top.apply_change(&change(FsChangeKind::Create, "/x", None)),
            ChangeOutcome::Ignored
        );
        assert_eq!(
            top.apply_change(&change(FsChangeKind::Modify, "/a", Some(0))),
            ChangeOutcome::Ignored
        );
        assert_eq!(sizes(&top), vec![100]);
    }

    #[test]
    fn remove_exact_path() {
        let mut top = tracker(3, &[("/a", 100), ("/b", 50)]);
        let outcome = top.apply_change(&change(FsChangeKind::Remove, "/a", None));
        assert_eq!(outcome, ChangeOutcome::Removed(1));
        assert_eq!(sizes(&top), vec![50]);
    }

    /// Removing a directory drops exactly the entries nested under it.
    #[test]
    fn remove_directory_prefix_drops_nested_entries_only() {
        let mut top = tracker(
            5,
            &[
                ("/data/logs/a.log", 400),
                ("/data/logs/old/b.log", 300),
                ("/data/logsbackup/c.log", 200),
                ("/data/d.bin", 100),
            ],
        );
        let outcome = top.apply_change(&change(FsChangeKind::Remove, "/data/logs", None));
        assert_eq!(outcome, ChangeOutcome::Removed(2));
        let paths: Vec<&str> = top.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/data/logsbackup/c.log", "/data/d.bin"]);
    }

    #[test]
    fn remove_unknown_path_is_unchanged() {
        let mut top = tracker(3, &[("/a", 100)]);
        let outcome = top.apply_change(&change(FsChangeKind::Remove, "/zzz", None));
        assert_eq!(outcome, ChangeOutcome::Unchanged);
        assert_eq!(top.len(), 1);
    }

    /// Entries of equal size keep their relative order across unrelated updates.
    #[test]
    fn equal_sizes_keep_relative_order() {
        let mut top = tracker(5, &[("/x", 10), ("/y", 10), ("/z", 10)]);
        top.apply_change(&change(FsChangeKind::Create, "/big", Some(99)));
        let paths: Vec<&str> = top.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/big", "/x", "/y", "/z"]);
    }

    #[test]
    fn snapshot_is_truncated_to_capacity() {
        let top = tracker(2, &[("/a", 1), ("/b", 3), ("/c", 2)]);
        assert_eq!(sizes(&top), vec![3, 2]);
    }

    #[test]
    fn snapshot_with_repeated_path_keeps_largest() {
        let top = tracker(5, &[("/a", 1), ("/b", 3), ("/a", 7)]);
        assert_eq!(top.len(), 2);
        assert_eq!(top.entries()[0].path, "/a");
        assert_eq!(top.entries()[0].size, 7);
    }

    #[test]
    fn remove_with_empty_path_changes_nothing() {
        let mut top = tracker(5, &[("/a/x", 10), ("/b/y", 5)]);
        assert_eq!(
            top.apply_change(&change(FsChangeKind::Remove, "", None)),
            ChangeOutcome::Unchanged
        );
        assert_eq!(sizes(&top), vec![10, 5]);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(TopFiles::with_capacity(0).capacity(), 1);
    }
}

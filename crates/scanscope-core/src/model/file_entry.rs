/// A single file in the largest-files list.
///
/// Paths are unique within one scan session; the engine reports them as
/// absolute, platform-native strings.
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Full path as reported by the scan engine.
    pub path: CompactString,
    /// File size in bytes.
    pub size: u64,
}

impl FileEntry {
    pub fn new(path: impl Into<CompactString>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    /// `true` if this entry is `target` itself or lives underneath it when
    /// `target` is read as a directory.
    ///
    /// The match respects separator boundaries: `/a/b` covers `/a/b/c`
    /// but not `/a/bc`.
    pub fn is_at_or_under(&self, target: &str) -> bool {
        if target.is_empty() {
            return false;
        }
        let path = self.path.as_str();
        if path == target {
            return true;
        }
        let prefix = target.trim_end_matches(['/', '\\']);
        match path.strip_prefix(prefix) {
            Some(rest) => rest.starts_with(['/', '\\']),
            None => false,
        }
    }
}

/// Data model for the ScanScope largest-files view.
///
/// Re-exports the file entry type, the bounded top-N tracker, and the
/// display formatting helpers.
pub mod file_entry;
pub mod size;
pub mod top_files;

pub use file_entry::FileEntry;
pub use top_files::{ChangeOutcome, TopFiles, DEFAULT_TOP_N};

/// Disk usage overview for the volume holding the selected root.
///
/// Produced by the external usage-query service, never persisted. The
/// presentation layer shows the most recent successful answer for the
/// currently selected root.
use crate::model::size;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskOverview {
    /// The path the query was made for.
    pub root_path: String,
    /// Mount point of the volume, e.g. "/" or "/Volumes/Data".
    pub mount_point: String,
    /// Volume label; falls back to the mount point when the platform has none.
    pub volume_name: String,
    /// Total capacity in bytes.
    pub total_bytes: u64,
    /// Space available to the current user in bytes.
    pub available_bytes: u64,
    /// `total_bytes - available_bytes`.
    pub used_bytes: u64,
    /// Usage percentage (0.0–100.0).
    pub used_percent: f64,
}

impl DiskOverview {
    /// Build an overview from raw capacity figures.
    ///
    /// Missing mount point / volume name fall back to the root path, the same
    /// way platforms without volume metadata report it.
    pub fn from_space(
        root_path: impl Into<String>,
        mount_point: Option<String>,
        volume_name: Option<String>,
        total_bytes: u64,
        available_bytes: u64,
    ) -> Self {
        let root_path = root_path.into();
        let mount_point = mount_point.unwrap_or_else(|| root_path.clone());
        let volume_name = volume_name.unwrap_or_else(|| mount_point.clone());
        let used_bytes = total_bytes.saturating_sub(available_bytes);
        let used_percent = if total_bytes > 0 {
            used_bytes as f64 / total_bytes as f64 * 100.0
        } else {
            0.0
        };

        Self {
            root_path,
            mount_point,
            volume_name,
            total_bytes,
            available_bytes,
            used_bytes,
            used_percent,
        }
    }

    /// One-line summary, e.g. `Data: 120.00 GB of 500.00 GB used (24.0%)`.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} of {} used ({:.1}%)",
            self.volume_name,
            size::format_size(self.used_bytes),
            size::format_size(self.total_bytes),
            self.used_percent
        )
    }
}

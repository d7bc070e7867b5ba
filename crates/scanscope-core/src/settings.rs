/// User-tunable limits and intervals.
///
/// Stored as `settings.json` in the ScanScope config directory. Missing keys
/// take their defaults, so older files keep loading as fields are added.
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::model::DEFAULT_TOP_N;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Minimum spacing between two non-forced disk-usage queries.
pub const DEFAULT_REFRESH_MIN_INTERVAL_MS: u64 = 8_000;
/// Quiet period after the selected path changes before querying usage.
pub const DEFAULT_PATH_DEBOUNCE_MS: u64 = 250;
/// Quiet period after a create/remove burst before querying usage.
pub const DEFAULT_CHANGE_DEBOUNCE_MS: u64 = 900;

const APP_DIR_NAME: &str = "scanscope";
const SETTINGS_FILE_NAME: &str = "settings.json";
const DATA_DIR_ENV: &str = "SCANSCOPE_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Capacity of the largest-files list.
    pub top_n: usize,
    /// Number of finished scans kept in the ledger.
    pub history_capacity: usize,
    pub refresh_min_interval_ms: u64,
    pub path_debounce_ms: u64,
    pub change_debounce_ms: u64,
    /// Where the scan ledger lives. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            refresh_min_interval_ms: DEFAULT_REFRESH_MIN_INTERVAL_MS,
            path_debounce_ms: DEFAULT_PATH_DEBOUNCE_MS,
            change_debounce_ms: DEFAULT_CHANGE_DEBOUNCE_MS,
            data_dir: None,
        }
    }
}

impl Settings {
    /// Load from the default location, writing defaults if the file is absent.
    pub fn load_or_init() -> Result<Self> {
        Self::load_or_init_at(&settings_path())
    }

    /// Load from `path`, writing defaults there if it does not exist yet.
    pub fn load_or_init_at(path: &Path) -> Result<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path)?;
            return Ok(settings);
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut parsed: Settings = serde_json::from_str(&raw)
            .with_context(|| format!("invalid JSON in {}", path.display()))?;
        if parsed.normalize() {
            parsed.save_to(path)?;
        }
        Ok(parsed)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory {}", parent.display())
            })?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Directory holding the scan ledger.
    ///
    /// `SCANSCOPE_DATA_DIR` wins over the file setting, which wins over the
    /// platform data directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(dir);
        }
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(env::temp_dir)
            .join(APP_DIR_NAME)
    }

    pub fn refresh_min_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_min_interval_ms)
    }

    pub fn path_debounce(&self) -> Duration {
        Duration::from_millis(self.path_debounce_ms)
    }

    pub fn change_debounce(&self) -> Duration {
        Duration::from_millis(self.change_debounce_ms)
    }

    /// Clamp values that would make a component degenerate. Returns `true`
    /// if anything changed.
    fn normalize(&mut self) -> bool {
        let mut changed = false;
        if self.top_n == 0 {
            self.top_n = 1;
            changed = true;
        }
        if self.history_capacity == 0 {
            self.history_capacity = 1;
            changed = true;
        }
        if self.data_dir.as_ref().is_some_and(|d| d.as_os_str().is_empty()) {
            self.data_dir = None;
            changed = true;
        }
        changed
    }
}

/// `<config dir>/scanscope/settings.json`.
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(env::temp_dir)
        .join(APP_DIR_NAME)
        .join(SETTINGS_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_initialised_with_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cfg").join(SETTINGS_FILE_NAME);
        let settings = Settings::load_or_init_at(&path).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, r#"{"top_n": 20}"#).unwrap();
        let settings = Settings::load_or_init_at(&path).unwrap();
        assert_eq!(settings.top_n, 20);
        assert_eq!(settings.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(settings.refresh_min_interval(), Duration::from_secs(8));
    }

    #[test]
    fn zero_capacities_are_clamped_and_saved() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, r#"{"top_n": 0, "history_capacity": 0}"#).unwrap();
        let settings = Settings::load_or_init_at(&path).unwrap();
        assert_eq!(settings.top_n, 1);
        assert_eq!(settings.history_capacity, 1);

        let reread: Settings = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread.top_n, 1);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "top_n = 3").unwrap();
        let err = Settings::load_or_init_at(&path).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }
}

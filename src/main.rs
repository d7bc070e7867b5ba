//! ScanScope ledger viewer.
//!
//! Loads the settings, opens the persisted scan ledger and prints it. The
//! live session controller lives in `scanscope-session` and is embedded by
//! a frontend that owns the scan engine; this binary does not drive it.

use anyhow::Context;
use scanscope_core::history::{HistoryLedger, JsonFileStore};
use scanscope_core::model::size::{format_count, format_duration, format_size};
use scanscope_core::settings::{settings_path, Settings};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialise structured logging; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("ScanScope starting");

    let settings = Settings::load_or_init()
        .with_context(|| format!("loading settings from {}", settings_path().display()))?;
    let data_dir = settings.resolved_data_dir();
    tracing::debug!("Settings: {:?}, data dir {}", settings, data_dir.display());

    let store = JsonFileStore::in_dir(&data_dir);
    let ledger_path = store.path().to_path_buf();
    let mut ledger = HistoryLedger::new(Box::new(store), settings.history_capacity);
    ledger.load();

    if ledger.is_empty() {
        println!("No finished scans recorded in {}", ledger_path.display());
        return Ok(());
    }

    println!("Recent scans ({}):", ledger_path.display());
    for entry in ledger.entries() {
        let finished = entry
            .finished_local()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown time".to_string());
        println!(
            "  {}  {:<40} {:>10} in {:>12} files  {}",
            finished,
            entry.root_path,
            format_size(entry.scanned_bytes),
            format_count(entry.scanned_files),
            format_duration(Duration::from_millis(entry.duration_ms)),
        );
    }

    Ok(())
}

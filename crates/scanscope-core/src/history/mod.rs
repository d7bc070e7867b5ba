/// Scan history: an append-only, capacity-bounded ledger of finished scans.
///
/// The newest entry is always first. Every mutation is written through to
/// a [`HistoryStore`], but only after the initial [`HistoryLedger::load`]
/// has run, so an empty in-memory ledger can never overwrite the persisted
/// one before it has been read.
pub mod store;

pub use store::{HistoryStore, JsonFileStore, MemoryStore, HISTORY_FILE_NAME};

use crate::engine::SessionId;
use crate::Result;
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Number of finished scans kept when none is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 6;

/// Summary of one finished scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Identity of the session that produced this entry.
    pub id: SessionId,
    pub root_path: String,
    pub scanned_files: u64,
    pub scanned_bytes: u64,
    pub duration_ms: u64,
    /// Unix epoch milliseconds.
    pub finished_at: i64,
}

impl HistoryEntry {
    /// Completion time in the local timezone, `None` if the stamp is out of range.
    pub fn finished_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.finished_at).single()
    }

    /// Validate one persisted record field by field.
    ///
    /// Returns `None` for anything that is not an object with a string
    /// `rootPath` and finite, non-negative numeric counters.
    fn from_record(record: &Value) -> Option<Self> {
        let root_path = record.get("rootPath")?.as_str()?.to_string();
        Some(Self {
            id: SessionId(finite_u64(record.get("id")?)?),
            root_path,
            scanned_files: finite_u64(record.get("scannedFiles")?)?,
            scanned_bytes: finite_u64(record.get("scannedBytes")?)?,
            duration_ms: finite_u64(record.get("durationMs")?)?,
            finished_at: i64::try_from(finite_u64(record.get("finishedAt")?)?).ok()?,
        })
    }
}

/// Accept integers and whole-valued floats; reject negatives, fractions, and strings.
fn finite_u64(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

/// The bounded, persisted ledger.
pub struct HistoryLedger {
    entries: Vec<HistoryEntry>,
    capacity: usize,
    loaded: bool,
    store: Box<dyn HistoryStore>,
}

impl HistoryLedger {
    /// Create an empty, not-yet-loaded ledger. Zero capacity is treated as one.
    pub fn new(store: Box<dyn HistoryStore>, capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
            loaded: false,
            store,
        }
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Read the persisted ledger, dropping malformed records individually.
    ///
    /// An unreadable store or a document that is not a JSON array yields an
    /// empty ledger; neither is reported to the user. Entries recorded
    /// before the load are kept in front of the persisted ones.
    pub fn load(&mut self) {
        let persisted = match self.store.read() {
            Ok(Some(data)) => parse_ledger(&data),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("History: could not read ledger: {}", e);
                Vec::new()
            }
        };

        for entry in persisted {
            if !self.entries.iter().any(|e| e.id == entry.id) {
                self.entries.push(entry);
            }
        }
        self.entries.truncate(self.capacity);
        self.loaded = true;
        info!("History: loaded {} entries", self.entries.len());
    }

    /// Prepend a finished scan.
    ///
    /// Returns `false` without touching anything if the newest entry already
    /// has this id (a repeated completion notification).
    pub fn record(&mut self, entry: HistoryEntry) -> bool {
        if self.entries.first().is_some_and(|head| head.id == entry.id) {
            debug!("History: session {} already recorded", entry.id);
            return false;
        }
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
        self.persist();
        true
    }

    /// Write the ledger through to the store. Skipped until loaded.
    ///
    /// Write failures are logged and otherwise ignored.
    pub fn persist(&self) {
        if !self.loaded {
            debug!("History: persist skipped, ledger not loaded yet");
            return;
        }
        if let Err(e) = self.try_persist() {
            warn!("History: could not persist ledger: {}", e);
        }
    }

    fn try_persist(&self) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.entries)?;
        self.store.write(&data)
    }
}

/// Parse a persisted document into valid entries, in stored order.
fn parse_ledger(data: &str) -> Vec<HistoryEntry> {
    let records = match serde_json::from_str::<Value>(data) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            warn!("History: persisted ledger is not an array, ignoring it");
            return Vec::new();
        }
        Err(e) => {
            warn!("History: persisted ledger is not valid JSON: {}", e);
            return Vec::new();
        }
    };

    let total = records.len();
    let entries: Vec<HistoryEntry> = records.iter().filter_map(HistoryEntry::from_record).collect();
    if entries.len() < total {
        debug!("History: dropped {} malformed records", total - entries.len());
    }
    entries
}

/// ScanScope Core: data model, engine protocol, and the scan ledger.
///
/// This crate contains all business logic that does not depend on the
/// session controller's event loop. It is designed to be reusable across
/// different frontends (GUI, CLI, TUI).
///
/// # Modules
///
/// - [`model`]: File entries, the bounded largest-files tracker, size formatting.
/// - [`engine`]: Notifications and replies exchanged with the external scan engine.
/// - [`usage`]: Disk usage overview returned by the usage-query service.
/// - [`history`]: Capacity-bounded ledger of finished scans and its stores.
/// - [`settings`]: User-tunable limits and intervals, persisted as JSON.
/// - [`error`]: Crate-wide error type.
pub mod engine;
pub mod error;
pub mod history;
pub mod model;
pub mod settings;
pub mod usage;

pub use error::{CoreError, Result};

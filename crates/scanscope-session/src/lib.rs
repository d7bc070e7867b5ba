/// ScanScope session controller.
///
/// Reconciles the scan engine's asynchronous notifications with the one
/// active scan session, keeps the live largest-files view, throttles
/// disk-usage queries, and records finished scans. Everything here runs on a
/// single thread; the engine and the usage service talk back through one
/// ordered channel. Data model and protocol types live in `scanscope-core`.
pub mod controller;
pub mod debounce;
pub mod error;
pub mod reconciler;
pub mod state;
pub mod throttle;

pub use controller::{SessionController, MAX_MESSAGES_PER_TICK};
pub use error::SessionError;
pub use reconciler::{admit, Admission, Reconciler, SessionContext, SessionPhase, StartOutcome};
pub use state::AppState;
pub use throttle::{RefreshReason, RefreshThrottler, RefreshTicket};

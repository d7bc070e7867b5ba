use thiserror::Error;

/// Precondition failures of the user-facing session actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No path selected to scan")]
    EmptyRoot,

    #[error("No active scan to cancel")]
    NoActiveSession,
}

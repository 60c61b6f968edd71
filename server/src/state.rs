//! Service lifecycle states.

use serde::Serialize;

/// Service operational state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    /// Storage is being opened.
    Starting,
    /// Accepting requests.
    Running,
    /// Draining; new mutations are refused.
    ShuttingDown,
    /// Stopped.
    Stopped,
}

impl ServiceState {
    /// Check if the service is accepting new requests.
    pub fn accepts_requests(&self) -> bool {
        matches!(self, ServiceState::Running)
    }

    /// Check if the service is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ServiceState::Stopped)
    }
}

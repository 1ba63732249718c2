//! Connection lifecycle states.

use std::fmt;

/// State of a [`crate::ConnectionClient`].
///
/// `Disconnected` is terminal: a client only enters it after an explicit
/// disconnect, a rejected handshake, or exhausting its reconnect attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    /// Waiting for, or running, reconnect attempt `attempt` (1-based)
    Reconnecting { attempt: u32 },
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Reconnecting { attempt } => write!(f, "reconnecting (attempt {attempt})"),
            ConnectionState::Disconnected => write!(f, "disconnected"),
        }
    }
}

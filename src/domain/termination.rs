//! Why a connection session ended.

use std::fmt;

/// Final state of a connection session.
///
/// Every variant except [`TerminationReason::Shutdown`] leads the supervisor
/// to start a fresh session after the cooldown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The server sent a close frame or the stream ended cleanly.
    NormalClose,
    /// No frame of any kind arrived within the idle timeout.
    IdleTimeout,
    /// Reading from or writing to the socket failed.
    TransportError(String),
    /// The server violated the WebSocket protocol.
    ProtocolError(String),
    /// The handshake failed or timed out.
    DialError(String),
    /// The process is shutting down.
    Shutdown,
}

impl TerminationReason {
    /// Returns a short, stable label for log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NormalClose => "normal_close",
            Self::IdleTimeout => "idle_timeout",
            Self::TransportError(_) => "transport_error",
            Self::ProtocolError(_) => "protocol_error",
            Self::DialError(_) => "dial_error",
            Self::Shutdown => "shutdown",
        }
    }

    /// Returns `true` if the supervisor should start another session.
    #[must_use]
    pub const fn should_restart(&self) -> bool {
        !matches!(self, Self::Shutdown)
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NormalClose => f.write_str("connection closed by server"),
            Self::IdleTimeout => f.write_str("no traffic within idle timeout"),
            Self::TransportError(e) => write!(f, "transport error: {e}"),
            Self::ProtocolError(e) => write!(f, "protocol error: {e}"),
            Self::DialError(e) => write!(f, "dial error: {e}"),
            Self::Shutdown => f.write_str("shutdown requested"),
        }
    }
}

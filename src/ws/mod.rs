//! WebSocket layer: dialing, the connection session and idle detection.
//!
//! A session subscribes to `/{topic}/ws` on the notification server and
//! forwards matching messages to a [`crate::clipboard::ClipboardSink`].

pub mod connection;
pub mod dial;
pub mod watchdog;

pub use connection::Session;
pub use watchdog::{LastTraffic, WatchdogOutcome};

//! Domain layer: wire envelope decoding and session termination reasons.

pub mod envelope;
pub mod termination;

pub use envelope::{Envelope, MESSAGE_EVENT, decode};
pub use termination::TerminationReason;

//! Clipboard delivery: command selection and execution.
//!
//! Selection ([`command::resolve`]) is kept apart from execution
//! ([`sink::run`]) so the platform decision table is testable without
//! spawning processes.

pub mod command;
pub mod sink;

pub use command::{ClipboardCommand, Environment, Os, resolve};
pub use sink::{ClipboardSink, SystemClipboard};

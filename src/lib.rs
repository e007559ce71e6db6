//! # ntfy-clip
//!
//! Subscribes to a single ntfy topic over a persistent WebSocket and copies
//! every text message it receives to the local system clipboard.
//!
//! The client is built to run unattended: any failure (dial error, server
//! close, transport error, silent connection death) ends the current
//! session and the supervisor starts a fresh one after a short cooldown.
//!
//! ## Architecture
//!
//! ```text
//! Supervisor (service/)
//!     │  restarts forever, fixed cooldown
//!     ├── Session (ws/)
//!     │     ├── dial + bearer auth
//!     │     ├── read loop ── Envelope decoder (domain/)
//!     │     └── idle watchdog (shared LastTraffic + CancellationToken)
//!     │
//!     └── ClipboardSink (clipboard/)
//!           └── pbcopy | clip.exe | wl-copy | xclip
//! ```
//!
//! [`config::Settings`] is built once from the environment and shared
//! read-only by every component.

pub mod clipboard;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod service;
pub mod ws;

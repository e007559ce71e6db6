//! Error types for configuration, frame decoding and clipboard delivery.
//!
//! Only [`ConfigError`] is fatal. Everything else is logged by the caller and
//! the connection (or the supervisor loop) carries on.
//!
//! | Error            | Raised by        | Effect                              |
//! |------------------|------------------|-------------------------------------|
//! | [`ConfigError`]  | `Settings`       | process exits before any dial       |
//! | [`DecodeError`]  | frame decoder    | frame dropped, connection kept      |
//! | [`DeliveryError`]| clipboard sink   | message dropped, connection kept    |

use std::io;
use std::process::ExitStatus;

/// Fatal startup error raised while building [`crate::config::Settings`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `TOPIC` is unset or empty.
    #[error("TOPIC environment variable is required")]
    MissingTopic,
}

/// A frame could not be decoded as a notification envelope.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload is not well-formed JSON of the expected shape.
    #[error("malformed envelope: {0}")]
    Json(#[from] serde_json::Error),
}

/// Clipboard delivery failed.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// No clipboard command is known for this OS / display environment.
    #[error("unsupported clipboard environment: {0}")]
    UnsupportedEnvironment(String),

    /// The clipboard command could not be started.
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Writing the payload to the command's stdin failed.
    #[error("failed to write to `{program}` stdin: {source}")]
    Write {
        /// Program whose stdin rejected the write.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Waiting for the command to exit failed.
    #[error("failed to wait for `{program}`: {source}")]
    Wait {
        /// Program that could not be awaited.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The command exited unsuccessfully (non-zero code or killed by signal).
    #[error("`{program}` exited with {status}")]
    ExitStatus {
        /// Program that failed.
        program: String,
        /// Exit status reported by the OS.
        status: ExitStatus,
    },
}

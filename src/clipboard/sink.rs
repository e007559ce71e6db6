//! Clipboard delivery through an external command.

use std::future::Future;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::command::{ClipboardCommand, Environment, resolve};
use crate::error::DeliveryError;

/// Destination for decoded message text.
///
/// Implementations must be cheap to share: the session holds one in an
/// `Arc` and calls [`ClipboardSink::deliver`] from a detached task per
/// message, so several deliveries may be in flight at once.
pub trait ClipboardSink: Send + Sync + 'static {
    /// Puts `payload` on the clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if the payload could not be delivered.
    fn deliver(&self, payload: String) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Delivers to the OS clipboard using the platform command chosen by
/// [`resolve`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    /// Creates a new system clipboard sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ClipboardSink for SystemClipboard {
    async fn deliver(&self, payload: String) -> Result<(), DeliveryError> {
        let command = resolve(&Environment::detect())?;
        tracing::info!(
            environment = command.environment,
            command = %command,
            bytes = payload.len(),
            "setting clipboard"
        );
        tracing::debug!(content = %payload, "clipboard content");
        run(&command, payload.as_bytes()).await
    }
}

/// Spawns `command`, writes `payload` to its stdin, closes stdin and waits.
///
/// # Errors
///
/// Returns [`DeliveryError`] on spawn failure, write failure or an
/// unsuccessful exit status.
pub async fn run(command: &ClipboardCommand, payload: &[u8]) -> Result<(), DeliveryError> {
    let program = command.program.to_string();

    let mut child = Command::new(command.program)
        .args(command.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .map_err(|source| DeliveryError::Spawn {
            program: program.clone(),
            source,
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        let written = async {
            stdin.write_all(payload).await?;
            stdin.shutdown().await
        }
        .await;
        // Dropping stdin closes the pipe so the command sees EOF.
        drop(stdin);
        if let Err(source) = written {
            if let Err(e) = child.kill().await {
                tracing::debug!(program = %program, error = %e, "could not kill clipboard command");
            }
            return Err(DeliveryError::Write { program, source });
        }
    }

    let status = child.wait().await.map_err(|source| DeliveryError::Wait {
        program: program.clone(),
        source,
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(DeliveryError::ExitStatus { program, status })
    }
}

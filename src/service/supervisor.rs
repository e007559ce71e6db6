//! Unbounded session restart loop.
//!
//! The [`Supervisor`] runs one [`Session`] at a time. Whatever ends a
//! session (clean close, dial failure, idle timeout, transport error) it
//! waits a fixed cooldown and dials again. There is no backoff growth and no
//! retry cap; only the shutdown token stops it.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::clipboard::ClipboardSink;
use crate::config::Settings;
use crate::domain::TerminationReason;
use crate::ws::Session;

/// Pause between a session ending and the next dial.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);

/// Restarts connection sessions until shutdown.
#[derive(Debug)]
pub struct Supervisor<S> {
    settings: Arc<Settings>,
    sink: Arc<S>,
    cooldown: Duration,
}

impl<S: ClipboardSink> Supervisor<S> {
    /// Creates a supervisor with the default cooldown.
    #[must_use]
    pub fn new(settings: Arc<Settings>, sink: Arc<S>) -> Self {
        Self {
            settings,
            sink,
            cooldown: DEFAULT_COOLDOWN,
        }
    }

    /// Overrides the cooldown between sessions.
    #[must_use]
    pub const fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Runs sessions until `shutdown` is cancelled.
    ///
    /// Returns the number of sessions started.
    pub async fn run(&self, shutdown: &CancellationToken) -> u64 {
        let mut sessions: u64 = 0;

        while !shutdown.is_cancelled() {
            let session = Session::new(Arc::clone(&self.settings), Arc::clone(&self.sink));
            let session_id = session.id();
            sessions = sessions.saturating_add(1);

            let reason = session.run(shutdown).await;
            if !reason.should_restart() {
                break;
            }
            self.log_termination(&session_id, &reason);

            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(self.cooldown) => {}
            }
        }

        tracing::info!(sessions, "supervisor stopped");
        sessions
    }

    fn log_termination(&self, session_id: &uuid::Uuid, reason: &TerminationReason) {
        let topic = self.settings.topic.as_str();
        let server = self.settings.server.as_str();
        let cooldown_secs = self.cooldown.as_secs_f64();
        match reason {
            TerminationReason::NormalClose => tracing::info!(
                %session_id, topic, server, reason = reason.kind(), cooldown_secs,
                "session ended: {reason}; reconnecting"
            ),
            _ => tracing::warn!(
                %session_id, topic, server, reason = reason.kind(), cooldown_secs,
                "session ended: {reason}; reconnecting"
            ),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::clipboard::SystemClipboard;

    #[test]
    fn default_cooldown_is_five_seconds() {
        let Ok(settings) = Settings::new("alerts") else {
            panic!("valid settings");
        };
        let sup = Supervisor::new(Arc::new(settings), Arc::new(SystemClipboard::new()));
        assert_eq!(sup.cooldown, Duration::from_secs(5));
        let sup = sup.with_cooldown(Duration::from_millis(10));
        assert_eq!(sup.cooldown, Duration::from_millis(10));
    }

    #[tokio::test]
    async fn cancelled_before_start_runs_nothing() {
        let Ok(settings) = Settings::new("alerts") else {
            panic!("valid settings");
        };
        let sup = Supervisor::new(Arc::new(settings), Arc::new(SystemClipboard::new()));
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        assert_eq!(sup.run(&shutdown).await, 0);
    }
}

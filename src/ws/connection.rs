//! WebSocket connection session state machine.
//!
//! A [`Session`] goes `Dialing → Authenticated → Reading → Terminated`. The
//! read loop runs in the caller's task; the idle watchdog runs in a spawned
//! task. Both stop on a shared child [`CancellationToken`], and the session
//! waits for the watchdog before returning, so nothing outlives it.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::task::JoinError;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::dial::{self, WsStream};
use super::watchdog::{self, LastTraffic, WatchdogOutcome};
use crate::clipboard::ClipboardSink;
use crate::config::Settings;
use crate::domain::{TerminationReason, envelope};

/// Upper bound on finishing the close handshake.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// One dial-to-termination lifetime of a subscription connection.
#[derive(Debug)]
pub struct Session<S> {
    id: uuid::Uuid,
    settings: Arc<Settings>,
    sink: Arc<S>,
}

impl<S: ClipboardSink> Session<S> {
    /// Creates a session that has not dialed yet.
    #[must_use]
    pub fn new(settings: Arc<Settings>, sink: Arc<S>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            settings,
            sink,
        }
    }

    /// Returns the session id used in log spans.
    #[must_use]
    pub const fn id(&self) -> uuid::Uuid {
        self.id
    }

    /// Runs the session to termination.
    ///
    /// Consumes the session; a terminated session is never reused.
    /// Cancelling `shutdown` interrupts dialing, the read wait and the
    /// watchdog immediately and yields [`TerminationReason::Shutdown`].
    pub async fn run(self, shutdown: &CancellationToken) -> TerminationReason {
        let span = tracing::info_span!(
            "session",
            session_id = %self.id,
            topic = %self.settings.topic,
            server = %self.settings.server,
        );
        self.run_inner(shutdown).instrument(span).await
    }

    async fn run_inner(self, shutdown: &CancellationToken) -> TerminationReason {
        tracing::debug!(url = %self.settings.ws_url(), "dialing");

        let dialed = tokio::select! {
            biased;
            () = shutdown.cancelled() => return TerminationReason::Shutdown,
            dialed = dial::dial(&self.settings) => dialed,
        };
        let mut stream = match dialed {
            Ok(stream) => stream,
            Err(e) => return TerminationReason::DialError(e),
        };

        tracing::info!(
            idle_timeout_secs = self.settings.idle_timeout.as_secs_f64(),
            "connected"
        );

        let traffic = Arc::new(LastTraffic::new());
        let cancel = shutdown.child_token();
        let watchdog = {
            let traffic = Arc::clone(&traffic);
            let cancel = cancel.clone();
            let idle_timeout = self.settings.idle_timeout;
            tokio::spawn(
                async move {
                    // Stops the read loop even if the watchdog panics.
                    let _stop = cancel.clone().drop_guard();
                    watchdog::watch(traffic, idle_timeout, cancel).await
                }
                .in_current_span(),
            )
        };

        let ended = self.read_loop(&mut stream, &traffic, &cancel).await;
        cancel.cancel();
        let reason = settle(ended, shutdown, watchdog.await);

        match reason {
            TerminationReason::NormalClose => finish_close(&mut stream, false).await,
            TerminationReason::IdleTimeout | TerminationReason::Shutdown => {
                finish_close(&mut stream, true).await;
            }
            _ => {}
        }

        reason
    }

    /// Reads frames until the connection ends (`Some`) or `cancel` fires
    /// (`None`).
    async fn read_loop(
        &self,
        stream: &mut WsStream,
        traffic: &LastTraffic,
        cancel: &CancellationToken,
    ) -> Option<TerminationReason> {
        loop {
            let frame = tokio::select! {
                biased;
                () = cancel.cancelled() => return None,
                frame = stream.next() => frame,
            };

            let message = match frame {
                None => {
                    tracing::debug!("stream ended");
                    return Some(TerminationReason::NormalClose);
                }
                Some(Err(e)) => return Some(classify(e)),
                Some(Ok(message)) => message,
            };

            traffic.touch();

            match message {
                Message::Text(text) => self.handle_payload(text.as_bytes()),
                Message::Binary(data) => self.handle_payload(&data),
                Message::Ping(payload) => {
                    let sent = tokio::select! {
                        biased;
                        () = cancel.cancelled() => return None,
                        sent = stream.send(Message::Pong(payload)) => sent,
                    };
                    if let Err(e) = sent {
                        return Some(classify(e));
                    }
                    tracing::trace!("ping answered");
                }
                Message::Pong(_) => tracing::trace!("pong received"),
                Message::Close(frame) => {
                    tracing::debug!(?frame, "close frame received");
                    return Some(TerminationReason::NormalClose);
                }
                Message::Frame(_) => {}
            }
        }
    }

    /// Decodes a data frame and dispatches any matching text.
    fn handle_payload(&self, raw: &[u8]) {
        match envelope::decode(raw, &self.settings.topic) {
            Ok(Some(text)) => {
                tracing::debug!(bytes = text.len(), "message received");
                self.dispatch(text);
            }
            Ok(None) => tracing::trace!("frame ignored"),
            Err(e) => tracing::warn!(error = %e, "dropping malformed frame"),
        }
    }

    /// Hands `text` to the sink on a detached task so a slow clipboard
    /// command never stalls the read loop.
    fn dispatch(&self, text: String) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(
            async move {
                if let Err(e) = sink.deliver(text).await {
                    tracing::warn!(error = %e, "clipboard delivery failed");
                }
            }
            .in_current_span(),
        );
    }
}

/// Decides why a session ended once the read loop and the watchdog have
/// both stopped.
///
/// `ended` is `None` when the read loop was cancelled rather than ending on
/// its own. Only the process shutdown token yields
/// [`TerminationReason::Shutdown`]; a failed watchdog is a restartable
/// error.
fn settle(
    ended: Option<TerminationReason>,
    shutdown: &CancellationToken,
    watched: Result<WatchdogOutcome, JoinError>,
) -> TerminationReason {
    match (ended, watched) {
        (Some(reason), _) => reason,
        (None, _) if shutdown.is_cancelled() => TerminationReason::Shutdown,
        (None, Ok(_)) => TerminationReason::IdleTimeout,
        (None, Err(e)) => TerminationReason::TransportError(format!("idle watchdog failed: {e}")),
    }
}

/// Completes the close handshake within [`CLOSE_TIMEOUT`].
///
/// With `initiate` the client sends its own close frame first. Either way it
/// keeps reading so any queued close reply is flushed, until the server
/// drops the connection.
async fn finish_close(stream: &mut WsStream, initiate: bool) {
    let closed = tokio::time::timeout(CLOSE_TIMEOUT, async {
        if initiate && stream.close(None).await.is_err() {
            return;
        }
        while let Some(Ok(_)) = stream.next().await {}
    })
    .await;
    if closed.is_err() {
        tracing::debug!("close handshake did not finish in time");
    }
}

/// Maps a read or write failure to a termination reason.
fn classify(error: tungstenite::Error) -> TerminationReason {
    match error {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            TerminationReason::NormalClose
        }
        // The peer dropped TCP; nothing was wrong with the frames themselves.
        tungstenite::Error::Protocol(e @ ProtocolError::ResetWithoutClosingHandshake) => {
            TerminationReason::TransportError(e.to_string())
        }
        tungstenite::Error::Protocol(e) => TerminationReason::ProtocolError(e.to_string()),
        tungstenite::Error::Capacity(e) => TerminationReason::ProtocolError(e.to_string()),
        other => TerminationReason::TransportError(other.to_string()),
    }
}

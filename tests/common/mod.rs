//! Shared helpers for integration tests: a scriptable in-process WebSocket
//! server standing in for ntfy, and in-memory clipboard sinks.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;

use ntfy_clip::clipboard::ClipboardSink;
use ntfy_clip::config::{Scheme, Settings};
use ntfy_clip::error::DeliveryError;

/// Topic used by every test.
pub const TOPIC: &str = "alerts";

/// Server side of a test connection.
pub type ServerStream = WebSocketStream<TcpStream>;

/// What the client sent during the HTTP upgrade.
#[derive(Debug, Default)]
pub struct Handshake {
    pub path: String,
    pub authorization: Option<String>,
}

/// Binds a listener on an ephemeral localhost port.
pub async fn bind() -> (TcpListener, SocketAddr) {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    (listener, addr)
}

/// Returns an address nothing is listening on.
pub async fn refused_addr() -> SocketAddr {
    let (listener, addr) = bind().await;
    drop(listener);
    addr
}

/// Accepts one WebSocket client and records its handshake.
pub async fn accept(listener: &TcpListener) -> (ServerStream, Handshake) {
    let Ok((tcp, _)) = listener.accept().await else {
        panic!("accept failed");
    };
    let mut handshake = Handshake::default();
    let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        handshake.path = req.uri().path().to_string();
        handshake.authorization = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(resp)
    };
    let Ok(ws) = tokio_tungstenite::accept_hdr_async(tcp, callback).await else {
        panic!("websocket handshake failed");
    };
    (ws, handshake)
}

/// Sends one frame, panicking on failure.
pub async fn send(ws: &mut ServerStream, message: Message) {
    if ws.send(message).await.is_err() {
        panic!("server send failed");
    }
}

/// Builds an ntfy JSON text frame.
pub fn envelope(topic: &str, event: &str, message: Option<&str>) -> Message {
    let mut body = serde_json::json!({
        "id": "test",
        "time": 1_700_000_000,
        "event": event,
        "topic": topic,
    });
    if let (Some(text), Some(obj)) = (message, body.as_object_mut()) {
        obj.insert("message".to_string(), serde_json::Value::from(text));
    }
    Message::text(body.to_string())
}

/// A `message` event for [`TOPIC`].
pub fn message(text: &str) -> Message {
    envelope(TOPIC, "message", Some(text))
}

/// Reads until the client goes away and returns everything it sent.
pub async fn drain_server(ws: &mut ServerStream) -> Vec<Message> {
    let mut received = Vec::new();
    while let Some(Ok(msg)) = ws.next().await {
        received.push(msg);
    }
    received
}

/// Starts a clean close from the server side and drains the reply.
pub async fn close(ws: &mut ServerStream) -> Vec<Message> {
    let _ = ws.close(None).await;
    drain_server(ws).await
}

/// Settings pointing at a local plain-text server.
pub fn settings(addr: SocketAddr, idle_timeout: Duration) -> Arc<Settings> {
    let Ok(mut settings) = Settings::new(TOPIC) else {
        panic!("valid settings");
    };
    settings.scheme = Scheme::Ws;
    settings.server = addr.to_string();
    settings.idle_timeout = idle_timeout;
    settings.connect_timeout = Duration::from_secs(2);
    Arc::new(settings)
}

/// Collects deliveries until none arrive for `quiet`.
pub async fn drain(rx: &mut mpsc::UnboundedReceiver<String>, quiet: Duration) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(Some(text)) = tokio::time::timeout(quiet, rx.recv()).await {
        out.push(text);
    }
    out
}

/// Sink that records every payload.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    tx: mpsc::UnboundedSender<String>,
}

impl RecordingSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ClipboardSink for RecordingSink {
    async fn deliver(&self, payload: String) -> Result<(), DeliveryError> {
        let _ = self.tx.send(payload);
        Ok(())
    }
}

/// Sink that records the payload and then never finishes, like a clipboard
/// command that hangs.
#[derive(Debug, Clone)]
pub struct HangingSink {
    tx: mpsc::UnboundedSender<String>,
}

impl HangingSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ClipboardSink for HangingSink {
    async fn deliver(&self, payload: String) -> Result<(), DeliveryError> {
        let _ = self.tx.send(payload);
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Sink that always fails.
#[derive(Debug, Clone, Copy)]
pub struct FailingSink;

impl ClipboardSink for FailingSink {
    async fn deliver(&self, _payload: String) -> Result<(), DeliveryError> {
        Err(DeliveryError::UnsupportedEnvironment(
            "test sink".to_string(),
        ))
    }
}

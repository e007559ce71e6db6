//! Subscription handshake: request construction and bounded dialing.

use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::config::Settings;

/// Client WebSocket stream over plain TCP or TLS.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Builds the handshake request for `settings`.
///
/// The bearer token, when configured, is attached as an `Authorization`
/// header. This is the only place credentials leave the process.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the token cannot be encoded
/// as a header value.
pub fn build_request(settings: &Settings) -> Result<Request, String> {
    let mut request = settings
        .ws_url()
        .into_client_request()
        .map_err(|e| format!("invalid url {}: {e}", settings.ws_url()))?;

    if let Some(token) = &settings.token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| format!("invalid token: {e}"))?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
    }

    Ok(request)
}

/// Dials the subscription endpoint, bounded by `settings.connect_timeout`.
///
/// # Errors
///
/// Returns a description of the failure if the request cannot be built,
/// the handshake fails, or it does not complete in time.
pub async fn dial(settings: &Settings) -> Result<WsStream, String> {
    let request = build_request(settings)?;

    match tokio::time::timeout(
        settings.connect_timeout,
        tokio_tungstenite::connect_async(request),
    )
    .await
    {
        Ok(Ok((stream, response))) => {
            tracing::debug!(status = %response.status(), "handshake complete");
            Ok(stream)
        }
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!(
            "handshake timed out after {:?}",
            settings.connect_timeout
        )),
    }
}

//! ntfy message envelope and the frame decoder.
//!
//! The server sends one JSON object per text frame:
//!
//! ```json
//! {"id":"x1","time":1700000000,"event":"message","topic":"alerts","message":"hello"}
//! ```
//!
//! Only `event`, `topic` and `message` are read; everything else is ignored
//! so server-side additions never break decoding.

use serde::Deserialize;

use crate::error::DecodeError;

/// Event discriminator for payload-bearing frames.
pub const MESSAGE_EVENT: &str = "message";

/// Wire envelope sent by the notification service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Envelope {
    /// Event type (`open`, `keepalive`, `message`, ...).
    pub event: String,
    /// Topic the event belongs to.
    pub topic: String,
    /// Text body; absent for non-message events and attachment-only messages.
    #[serde(default)]
    pub message: Option<String>,
}

impl Envelope {
    /// Parses an envelope from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Json`] if `raw` is not a JSON object with
    /// string `event` and `topic` fields.
    pub fn parse(raw: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Returns `true` if this is a `message` event for `topic`.
    #[must_use]
    pub fn is_message_for(&self, topic: &str) -> bool {
        self.topic == topic && self.event == MESSAGE_EVENT
    }

    /// Consumes the envelope and returns its text if it is a `message` event
    /// for `topic`.
    #[must_use]
    pub fn into_text_for(self, topic: &str) -> Option<String> {
        if self.is_message_for(topic) {
            self.message
        } else {
            None
        }
    }
}

/// Decodes a raw frame and extracts the text to deliver, if any.
///
/// Returns `Ok(None)` for other topics, non-`message` events and message
/// events without a text body.
///
/// # Errors
///
/// Returns [`DecodeError`] if the frame is not a well-formed envelope.
pub fn decode(raw: &[u8], topic: &str) -> Result<Option<String>, DecodeError> {
    Ok(Envelope::parse(raw)?.into_text_for(topic))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn matching_message_yields_text() {
        let raw = br#"{"event":"message","topic":"alerts","message":"hello"}"#;
        let Ok(text) = decode(raw, "alerts") else {
            panic!("decode failed");
        };
        assert_eq!(text.as_deref(), Some("hello"));
    }

    #[test]
    fn unicode_is_preserved_exactly() {
        let body = "héllo \u{1F600}\n\ttabs \"quotes\" 日本語";
        let raw = serde_json::json!({
            "event": "message",
            "topic": "alerts",
            "message": body,
        })
        .to_string();
        let Ok(Some(text)) = decode(raw.as_bytes(), "alerts") else {
            panic!("expected text");
        };
        assert_eq!(text, body);
    }

    #[test]
    fn other_topic_is_ignored() {
        let raw = br#"{"event":"message","topic":"other","message":"hello"}"#;
        assert!(matches!(decode(raw, "alerts"), Ok(None)));
    }

    #[test]
    fn non_message_events_are_ignored() {
        for event in ["open", "keepalive", "poll_request", "Message"] {
            let raw = format!(r#"{{"event":"{event}","topic":"alerts","message":"x"}}"#);
            assert!(
                matches!(decode(raw.as_bytes(), "alerts"), Ok(None)),
                "event={event}"
            );
        }
    }

    #[test]
    fn message_without_body_is_noop() {
        let raw = br#"{"event":"message","topic":"alerts","attachment":{"name":"a.png"}}"#;
        assert!(matches!(decode(raw, "alerts"), Ok(None)));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let raw = br#"{"id":"abc","time":1,"expires":2,"event":"message","topic":"alerts","message":"m","priority":5,"tags":["a"]}"#;
        assert!(matches!(decode(raw, "alerts"), Ok(Some(ref m)) if m == "m"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(decode(b"{not json", "alerts").is_err());
        assert!(decode(b"", "alerts").is_err());
        assert!(decode(b"[1,2,3]", "alerts").is_err());
    }

    #[test]
    fn missing_required_fields_is_an_error() {
        assert!(decode(br#"{"event":"message"}"#, "alerts").is_err());
    }

    #[test]
    fn envelope_parse_exposes_fields() {
        let Ok(env) = Envelope::parse(br#"{"event":"open","topic":"alerts"}"#) else {
            panic!("parse failed");
        };
        assert_eq!(env.event, "open");
        assert_eq!(env.topic, "alerts");
        assert!(env.message.is_none());
        assert!(!env.is_message_for("alerts"));
    }
}

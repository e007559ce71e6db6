//! Client settings loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file that
//! `main` loads with `dotenvy`). The resulting [`Settings`] is built once at
//! startup, wrapped in an `Arc` and shared read-only by every session.

use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

/// Default notification server host.
pub const DEFAULT_SERVER: &str = "ntfy.sh";

/// Default idle timeout in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 120;

/// Upper bound on the WebSocket handshake (TCP + TLS + upgrade).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// WebSocket URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Plain `ws://`.
    Ws,
    /// TLS `wss://`.
    #[default]
    Wss,
}

impl Scheme {
    /// Parses `ws` / `wss` (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ws" => Some(Self::Ws),
            "wss" => Some(Self::Wss),
            _ => None,
        }
    }

    /// Returns `true` for `wss`.
    #[must_use]
    pub const fn is_secure(self) -> bool {
        matches!(self, Self::Wss)
    }

    /// Returns the scheme as it appears in a URL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable client settings.
///
/// Loaded once at startup via [`Settings::from_env`].
#[derive(Clone)]
pub struct Settings {
    /// Notification server host (optionally with `:port`).
    pub server: String,

    /// `ws` or `wss`.
    pub scheme: Scheme,

    /// Topic to subscribe to. Never empty.
    pub topic: String,

    /// Bearer token sent in the handshake, if any.
    pub token: Option<String>,

    /// Maximum gap between two inbound frames before the connection is
    /// considered dead.
    pub idle_timeout: Duration,

    /// Bound on the WebSocket handshake.
    pub connect_timeout: Duration,
}

impl Settings {
    /// Creates settings for `topic` with every other field at its default.
    ///
    /// Surrounding whitespace is stripped from `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTopic`] if `topic` is empty.
    pub fn new(topic: impl Into<String>) -> Result<Self, ConfigError> {
        let topic = topic.into().trim().to_string();
        if topic.is_empty() {
            return Err(ConfigError::MissingTopic);
        }
        Ok(Self {
            server: DEFAULT_SERVER.to_string(),
            scheme: Scheme::default(),
            topic,
            token: None,
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }

    /// Loads settings from the process environment.
    ///
    /// A `.env` file is not read here; `main` loads it before logging is
    /// initialised so `DEV` and `RUST_LOG` can come from it too.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTopic`] if `TOPIC` is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    ///
    /// Unset or empty variables take their defaults. `TIMEOUT` values that
    /// are not a positive integer fall back to
    /// [`DEFAULT_IDLE_TIMEOUT_SECS`]; unknown `SCHEME` values fall back to
    /// `wss`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTopic`] if `TOPIC` is unset or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut settings = Self::new(var("TOPIC").unwrap_or_default())?;

        if let Some(server) = var("SERVER") {
            settings.server = server.trim().to_string();
        }

        if let Some(raw) = var("SCHEME") {
            settings.scheme = Scheme::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(scheme = %raw, "unknown SCHEME, using wss");
                Scheme::Wss
            });
        }

        settings.token = var("TOKEN");
        settings.idle_timeout = parse_timeout(var("TIMEOUT").as_deref());

        Ok(settings)
    }

    /// Returns the subscription URL, `{scheme}://{server}/{topic}/ws`.
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("{}://{}/{}/ws", self.scheme, self.server, self.topic)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("server", &self.server)
            .field("scheme", &self.scheme)
            .field("topic", &self.topic)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("idle_timeout", &self.idle_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Parses `TIMEOUT` seconds; non-positive or invalid input gives the default.
fn parse_timeout(raw: Option<&str>) -> Duration {
    let secs = raw
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|v| u64::try_from(v).ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

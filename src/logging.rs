//! Tracing subscriber setup.
//!
//! `RUST_LOG` always wins. Without it the level is `debug` when `DEV` is set
//! and `info` otherwise. `LOG_FORMAT=json` switches to JSON lines for
//! service managers that ingest structured logs.

use tracing_subscriber::EnvFilter;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a `LOG_FORMAT` value; anything but `json`/`jsonl` is text.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" | "jsonl" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Returns the filter directive used when `RUST_LOG` is unset.
#[must_use]
pub const fn default_directive(dev: bool) -> &'static str {
    if dev { "debug" } else { "info" }
}

/// Installs the global tracing subscriber from the process environment.
pub fn init() {
    let dev = std::env::var_os("DEV").is_some();
    let format = std::env::var("LOG_FORMAT")
        .map(|v| LogFormat::parse(&v))
        .unwrap_or_default();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(dev)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

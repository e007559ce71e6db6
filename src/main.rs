//! ntfy-clip entry point.
//!
//! Loads settings, then supervises the topic subscription until Ctrl-C or
//! SIGTERM.

use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use ntfy_clip::clipboard::SystemClipboard;
use ntfy_clip::config::Settings;
use ntfy_clip::logging;
use ntfy_clip::service::{Supervisor, shutdown};

#[tokio::main]
async fn main() -> ExitCode {
    // Pick up a .env file before reading DEV / RUST_LOG
    dotenvy::dotenv().ok();
    logging::init();

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("tls crypto provider already installed");
    }

    // Load configuration
    let settings = match Settings::from_env() {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            tracing::error!(error = %e, "configuration error");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        server = %settings.server,
        scheme = %settings.scheme,
        tls = settings.scheme.is_secure(),
        topic = %settings.topic,
        authenticated = settings.token.is_some(),
        idle_timeout_secs = settings.idle_timeout.as_secs(),
        "starting ntfy-clip"
    );

    let shutdown_token = CancellationToken::new();
    shutdown::cancel_on_signal(shutdown_token.clone());

    let supervisor = Supervisor::new(settings, Arc::new(SystemClipboard::new()));
    supervisor.run(&shutdown_token).await;

    tracing::info!("shutdown complete");
    ExitCode::SUCCESS
}

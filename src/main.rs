//! # Bearer Auth Server
//!
//! ## Environment Setup
//! Copy `.env.example` to `.env` and set at least:
//! ```bash
//! JWT_SECRET=<32+ byte secret>
//! JWT_EXPIRATION_MS=86400000
//! ```
//!
//! ## Running the Server
//! ```bash
//! cargo run
//! ```
//!
//! The server starts on `http://0.0.0.0:3000` by default.
//!
//! ## Health Check
//! ```bash
//! curl http://localhost:3000/ping
//! ```

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bearer_auth_server::{server, Config};

/// Application entry point.
///
/// Loads `.env`, installs the tracing subscriber, reads configuration and runs
/// the server. Missing or invalid signing configuration aborts startup.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false) // Don't show module targets for cleaner output
                .compact(),
        )
        .init();

    tracing::info!("🏁 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!("🏗️  Build profile: {}", if cfg!(debug_assertions) { "debug" } else { "release" });

    let config = Config::from_env().context("Failed to load configuration from environment")?;
    tracing::debug!("Loaded configuration: {:?}", config);

    server::start(config).await
}

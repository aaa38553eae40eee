/// Profile System
///
/// A small web application for managing user profile records and their
/// uploaded images: list, add, edit and delete through a browser.

mod api;
mod blob_store;
mod config;
mod context;
mod db;
mod error;
mod record_service;
mod record_store;
mod server;

use config::ServerConfig;
use context::AppContext;
use error::ProfileResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ProfileResult<()> {
    // Pick up RUST_LOG from .env before the filter reads it
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profile_system=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;
    tracing::info!(
        "Profile System v{} (log level {})",
        env!("CARGO_PKG_VERSION"),
        config.logging.level
    );

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

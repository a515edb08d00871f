use std::sync::Arc;

use orgmap::config::{DEFAULT_CONFIG_FILE, Settings};
use orgmap::session::SqliteSessions;
use orgmap::{Result, server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config_file = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let settings = Settings::load(&config_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log.filter)))
        .init();

    let mode = settings.persistence_mode();
    info!(?mode, config = %config_file, "opening store");
    let sessions = Arc::new(SqliteSessions::new(mode)?);

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(%address, "listening");
    axum::serve(listener, server::router(sessions)).await?;
    Ok(())
}

//! docbridge server binary
//!
//! Loads configuration from `server.*` and `DOCBRIDGE_SERVER__*` variables and
//! serves the CSV upload and document query API.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}

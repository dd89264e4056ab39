//! Romeria Server - HTTP API for the testimony pipeline
//!
//! This binary serves the public submission forms and the testimonial
//! feed over REST endpoints.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}

//! Server command implementation

use std::path::Path;

use anyhow::Result;
use spendcast_core::ForecastConfig;
use spendcast_server::AppState;

pub async fn cmd_serve(
    file: &Path,
    config: ForecastConfig,
    host: &str,
    port: u16,
    allow_origins: Vec<String>,
) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("Ledger file not found: {}", file.display());
    }

    println!("🚀 Starting Spendcast web server...");
    println!("   Ledger: {}", file.display());
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   Defaults: {} day horizon, {:.0}% confidence",
        config.horizon,
        config.confidence * 100.0
    );
    if !allow_origins.is_empty() {
        println!("   CORS origins: {}", allow_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let state = AppState::new(file.to_path_buf(), config).with_allowed_origins(allow_origins);
    spendcast_server::serve(state, host, port).await?;

    Ok(())
}

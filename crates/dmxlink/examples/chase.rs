//! Simple chase across the first 8 channels of universe 0
//!
//! Usage: `cargo run --example chase [config.toml]`
//!
//! Set `RUST_LOG=dmxlink=trace` to see every frame.

use std::time::Duration;

use anyhow::{Context, Result};
use dmxlink::{ArtNetClient, ArtNetConfig};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ArtNetConfig::load(&path)
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => ArtNetConfig::default(),
    };

    let (errors_tx, mut errors_rx) = tokio::sync::mpsc::unbounded_channel();
    let client = ArtNetClient::connect(config)
        .await
        .context("Failed to create Art-Net client")?
        .with_error_sink(errors_tx);

    tokio::spawn(async move {
        while let Some(e) = errors_rx.recv().await {
            tracing::error!("Background send failed: {}", e);
        }
    });

    for step in 0..64u16 {
        let mut values = [0u8; 8];
        values[(step % 8) as usize] = 255;

        if let Err(e) = client.set(0, 1, &values).await {
            if e.is_busy() {
                tracing::debug!("Universe 0 busy, step {} rides along with the next frame", step);
            } else {
                return Err(e).context("Failed to send chase step");
            }
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    client.close();
    Ok(())
}

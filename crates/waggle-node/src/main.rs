//! # Waggle Node
//!
//! The main entry point for a Waggle node: initialize logging, load
//! configuration, start the runtime and wait for Ctrl+C.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use waggle_node::{NodeConfig, NodeRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = NodeConfig::load();

    // Create and start the node runtime
    let runtime = NodeRuntime::start(config).await?;

    // Keep the node running
    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    // Graceful shutdown
    runtime.shutdown().await;

    Ok(())
}

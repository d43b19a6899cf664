//! # Node Runtime
//!
//! Drives the autopeering subsystem through its whole life: assemble,
//! start, report status while running, and stop exactly once on shutdown.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use waggle_autopeering::SessionHandle;

use crate::container::NodeConfig;
use crate::wiring;

/// How long shutdown waits for the autopeering task to finish.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The running node.
///
/// Startup is all-or-nothing: any failure while the subsystem comes up is
/// returned to the caller and nothing keeps running in the background.
/// After a successful start the session lives on a spawned task until
/// [`NodeRuntime::shutdown`] fires the one-shot signal.
#[derive(Debug)]
pub struct NodeRuntime {
    session: SessionHandle,
    shutdown_tx: watch::Sender<bool>,
    run_task: JoinHandle<()>,
}

impl NodeRuntime {
    /// Assembles and starts the node.
    ///
    /// # Errors
    ///
    /// Fails when the configuration cannot be turned into a working
    /// subsystem (bad identity seed) or when startup itself fails
    /// (unreachable advertised address, occupied port). Both are final;
    /// the caller decides whether to exit or rebuild with a different
    /// configuration.
    pub async fn start(config: NodeConfig) -> Result<Self> {
        info!("===========================================");
        info!("  Waggle Node Runtime v0.1.0");
        info!("===========================================");

        let supervisor = wiring::build_autopeering(&config.autopeering)
            .context("autopeering assembly failed")?;
        let session = supervisor
            .start()
            .await
            .context("autopeering startup failed")?;
        let handle = session.handle();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let run_task = tokio::spawn(session.run_until_shutdown(shutdown_rx));

        info!("Node '{}' is up", config.name);

        Ok(Self {
            session: handle,
            shutdown_tx,
            run_task,
        })
    }

    /// Status view of the autopeering session.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Stops the node gracefully.
    ///
    /// Signals the session, then waits up to [`SHUTDOWN_GRACE`] for its
    /// teardown to finish.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        match tokio::time::timeout(SHUTDOWN_GRACE, self.run_task).await {
            Ok(Ok(())) => info!("Shutdown complete"),
            Ok(Err(e)) => error!("Autopeering task failed: {}", e),
            Err(_) => error!(
                "Autopeering did not stop within {}s",
                SHUTDOWN_GRACE.as_secs()
            ),
        }
    }
}

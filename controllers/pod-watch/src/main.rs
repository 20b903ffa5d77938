//! Pod Watch
//!
//! Logs pod lifecycle changes in a Kubernetes cluster:
//! - CREATED: a pod appeared
//! - UPDATED: phase, IP, node, container readiness, labels or annotations changed
//! - DELETED: a pod went away
//!
//! One line per change on stdout; diagnostics go to stderr via `tracing`.

mod client;
mod config;
mod controller;
mod error;
mod informer;
mod signal;
#[cfg(test)]
mod test_utils;

use crate::config::{Cli, WatchConfig};
use crate::controller::LifecycleController;
use crate::error::ControllerError;
use crate::informer::PodInformer;
use clap::Parser;
use pod_events::{EventFormatter, ResourceWatcher, StdoutSink};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ControllerError> {
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }

    info!("Starting Pod Watch");
    let config = WatchConfig::from_cli(&cli)?;

    info!("Configuration:");
    info!("  Namespace: {}", config.scope);
    info!("  Sync timeout: {:?}", config.sync_timeout);
    info!("  Output: {}", config.output);

    let client = client::build_client(cli.kubeconfig.as_deref(), cli.master.as_deref()).await?;
    let informer = PodInformer::new(config.scope.api(client));
    let handler = Arc::new(ResourceWatcher::new(EventFormatter::new(config.output), StdoutSink));

    let shutdown = CancellationToken::new();
    let listener = signal::spawn_shutdown_listener(shutdown.clone())?;

    let mut controller =
        LifecycleController::new(informer, handler, &config, shutdown.clone(), StdoutSink);
    let result = controller.run().await;

    shutdown.cancel();
    if let Err(e) = listener.await {
        debug!("Signal listener ended abnormally: {}", e);
    }
    result
}

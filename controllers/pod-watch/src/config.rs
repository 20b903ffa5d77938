//! Command-line configuration.

use crate::error::ControllerError;
use clap::Parser;
use k8s_openapi::api::core::v1::Pod;
use kube::{Api, Client};
use pod_events::OutputFormat;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Watches pods and logs their lifecycle changes.
#[derive(Debug, Clone, Parser)]
#[command(name = "pod-watch", version, about)]
pub struct Cli {
    /// Path to kubeconfig (out-of-cluster). Leave empty for in-cluster.
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// API server address (optional)
    #[arg(long, value_name = "URL")]
    pub master: Option<String>,

    /// Namespace to watch (empty = all namespaces)
    #[arg(long, short = 'n', env = "WATCH_NAMESPACE", default_value = "")]
    pub namespace: String,

    /// Seconds to wait for the initial pod list before giving up
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    pub sync_timeout: u64,

    /// Change log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub output: OutputFormat,
}

/// Which pods to watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchScope {
    /// Every namespace
    All,
    /// A single namespace
    Namespace(String),
}

impl WatchScope {
    /// Empty or blank means all namespaces.
    #[must_use]
    pub fn from_namespace(namespace: &str) -> Self {
        match namespace.trim() {
            "" => Self::All,
            ns => Self::Namespace(ns.to_string()),
        }
    }

    /// Pod API for this scope.
    pub fn api(&self, client: Client) -> Api<Pod> {
        match self {
            Self::All => Api::all(client),
            Self::Namespace(ns) => Api::namespaced(client, ns),
        }
    }
}

impl fmt::Display for WatchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Namespace(ns) => f.write_str(ns),
        }
    }
}

/// Validated watch settings.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Pods to watch
    pub scope: WatchScope,
    /// Bound on the initial cache sync
    pub sync_timeout: Duration,
    /// Change log format
    pub output: OutputFormat,
}

impl WatchConfig {
    /// Validates the parsed command line.
    pub fn from_cli(cli: &Cli) -> Result<Self, ControllerError> {
        if cli.sync_timeout == 0 {
            return Err(ControllerError::InvalidConfig(
                "--sync-timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(Self {
            scope: WatchScope::from_namespace(&cli.namespace),
            sync_timeout: Duration::from_secs(cli.sync_timeout),
            output: cli.output,
        })
    }
}

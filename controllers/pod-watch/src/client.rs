//! Kubernetes client construction.
//!
//! Credentials are resolved in order: an explicit kubeconfig path, the
//! in-cluster service account, then the default kubeconfig
//! (`$KUBECONFIG` or `~/.kube/config`). `--master` replaces the cluster URL
//! of whichever configuration wins.

use crate::error::ControllerError;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;
use tracing::{debug, info};

/// Builds an API client from the command-line overrides.
pub async fn build_client(
    kubeconfig: Option<&Path>,
    master: Option<&str>,
) -> Result<Client, ControllerError> {
    let mut config = resolve_config(kubeconfig).await?;
    if let Some(master) = master {
        override_cluster_url(&mut config, master)?;
    }

    info!("  API server: {}", config.cluster_url);
    Ok(Client::try_from(config)?)
}

async fn resolve_config(kubeconfig: Option<&Path>) -> Result<Config, ControllerError> {
    let options = KubeConfigOptions::default();

    if let Some(path) = kubeconfig {
        info!("  Kubeconfig: {}", path.display());
        let kubeconfig = Kubeconfig::read_from(path)?;
        return Ok(Config::from_custom_kubeconfig(kubeconfig, &options).await?);
    }

    match Config::incluster() {
        Ok(config) => {
            info!("  Credentials: in-cluster service account");
            Ok(config)
        }
        Err(e) => {
            // Dev machines: fall back to the default kubeconfig
            debug!("In-cluster configuration unavailable: {}", e);
            info!("  Credentials: default kubeconfig");
            Ok(Config::from_kubeconfig(&options).await?)
        }
    }
}

/// Points `config` at `master`. Blank values leave it untouched.
fn override_cluster_url(config: &mut Config, master: &str) -> Result<(), ControllerError> {
    let master = master.trim();
    if master.is_empty() {
        return Ok(());
    }

    config.cluster_url = master.parse::<http::Uri>().map_err(|e| {
        ControllerError::InvalidConfig(format!("invalid --master URL '{master}': {e}"))
    })?;
    Ok(())
}

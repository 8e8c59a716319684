use anyhow::Context as _;
use futures::StreamExt;
use kube::runtime::{watcher, Controller};
use kube::{Api, Client};
use rhmi_config_operator::controller::{error_policy, reconcile, Context};
use rhmi_config_operator::crd::RHMIConfig;
use rhmi_config_operator::server::{
    create_metrics, run_health_server, shutdown_channel, wait_for_signal, ReadinessState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Default port for health and metrics endpoints
const DEFAULT_HEALTH_PORT: u16 = 8080;

/// How long the health server gets to drain after shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Namespace to watch, `None` for every namespace
///
/// Read from `RHMI_WATCH_NAMESPACE`; blank counts as unset.
fn watch_namespace(raw: Option<String>) -> Option<String> {
    raw.map(|ns| ns.trim().to_string()).filter(|ns| !ns.is_empty())
}

/// Health server port from `RHMI_HEALTH_PORT`
fn health_port(raw: Option<String>) -> anyhow::Result<u16> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(DEFAULT_HEALTH_PORT),
        Some(value) => value
            .parse()
            .with_context(|| format!("RHMI_HEALTH_PORT must be a port number, got {:?}", value)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting RHMIConfig operator");

    let namespace = watch_namespace(std::env::var("RHMI_WATCH_NAMESPACE").ok());
    let port = health_port(std::env::var("RHMI_HEALTH_PORT").ok())?;

    let (shutdown_controller, shutdown_signal) = shutdown_channel();
    let readiness = ReadinessState::new();
    let metrics = create_metrics().context("Failed to create metrics registry")?;

    let client = match Client::try_default().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to create Kubernetes client");
            return Err(e.into());
        }
    };
    info!("Connected to Kubernetes cluster");

    let health_readiness = readiness.clone();
    let health_metrics = metrics.clone();
    let health_handle = tokio::spawn(async move {
        if let Err(e) =
            run_health_server(port, health_readiness, health_metrics, shutdown_signal).await
        {
            warn!(error = %e, "Health server failed");
        }
    });

    let configs: Api<RHMIConfig> = match namespace.as_deref() {
        Some(ns) => {
            info!(namespace = %ns, "Watching RHMIConfig resources in namespace");
            Api::namespaced(client.clone(), ns)
        }
        None => {
            info!("Watching RHMIConfig resources in all namespaces");
            Api::all(client.clone())
        }
    };

    let ctx = Arc::new(Context::new(client, Some(metrics)));

    readiness.set_ready();
    info!("Controller ready, starting reconciliation loop");

    // error_policy logs failures, only successes are logged here
    let controller = Controller::new(configs, watcher::Config::default())
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            if let Ok((object, _)) = res {
                info!(config = %object.name, namespace = ?object.namespace, "Reconciled");
            }
        });

    tokio::select! {
        _ = controller => {
            info!("Controller stream ended");
        }
        signal = wait_for_signal() => {
            match signal {
                Ok(name) => info!(signal = name, "Initiating graceful shutdown"),
                Err(e) => error!(error = %e, "Signal handler failed, shutting down"),
            }
            readiness.set_not_ready();
        }
    }

    shutdown_controller.shutdown();

    if tokio::time::timeout(SHUTDOWN_GRACE, health_handle)
        .await
        .is_err()
    {
        warn!("Health server did not stop in time");
    }

    info!("RHMIConfig operator shut down");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

//! Startup orchestration.
//!
//! # Responsibilities
//! - Acquire the single-instance lock
//! - Initialize subsystems in dependency order
//! - Start background tasks (probe monitor, metrics)
//! - Serve the control socket until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::adapter;
use crate::config::TranslatorConfig;
use crate::dispatch::Orchestrator;
use crate::health::ProbeMonitor;
use crate::lifecycle::instance::{InstanceError, InstanceLock};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::net::ControlServer;
use crate::observability::metrics;
use crate::registry::{Registry, RegistryError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid address '{value}' for {field}")]
    Address { field: &'static str, value: String },

    #[error(transparent)]
    Instance(#[from] InstanceError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn parse_addr(field: &'static str, value: &str) -> Result<SocketAddr, StartupError> {
    value.parse().map_err(|_| StartupError::Address {
        field,
        value: value.to_string(),
    })
}

/// Run the daemon until Ctrl-C.
///
/// Returns `Ok` without doing anything when another instance already holds
/// the lock.
pub async fn run(config: TranslatorConfig) -> Result<(), StartupError> {
    let lock_addr = parse_addr("instance.lock_address", &config.instance.lock_address)?;
    let lock = match InstanceLock::acquire(lock_addr).await {
        Ok(lock) => lock,
        Err(InstanceError::AlreadyRunning(addr)) => {
            tracing::info!(address = %addr, "translite is already running, exiting");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let client = adapter::http_client(&config.http)?;
    let registry = Arc::new(Registry::from_config(&config, client)?);
    let orchestrator = Arc::new(Orchestrator::from_config(&config, Arc::clone(&registry)));

    tracing::info!(
        backends = registry.len(),
        max_attempts = orchestrator.policy().max_attempts,
        overall_timeout_ms = config.dispatch.overall_timeout_ms,
        race_width = orchestrator.policy().race_width,
        "Translator ready"
    );

    if config.observability.metrics_enabled {
        let addr = parse_addr("observability.metrics_address", &config.observability.metrics_address)?;
        metrics::init_metrics(addr);
    }

    let shutdown = Shutdown::new();

    if let Some(prober) = orchestrator.prober() {
        let monitor = ProbeMonitor::new(
            Arc::clone(&registry),
            prober.clone(),
            Duration::from_secs(config.probe.interval_secs),
        );
        let rx = shutdown.subscribe();
        tokio::spawn(async move { monitor.run(rx).await });
    }

    let server = ControlServer::new(
        lock.into_listener(),
        Arc::clone(&orchestrator),
        config.instance.max_clients,
    );
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(async move { server.run(server_shutdown).await });

    signals::shutdown_on_ctrl_c(shutdown).await;

    if let Err(e) = server_task.await {
        tracing::error!(error = %e, "Control server task failed");
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

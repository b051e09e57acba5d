//! Control socket server.
//!
//! # Responsibilities
//! - Accept local clients, bounded by `instance.max_clients`
//! - Read one JSON command per line and answer with one JSON reply
//! - Route translations through a shared [`RequestSlot`]

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Semaphore};

use crate::dispatch::{Orchestrator, RequestSlot, TranslateOptions};
use crate::net::wire::{Command, Reply};

pub struct ControlServer {
    listener: TcpListener,
    orchestrator: Arc<Orchestrator>,
    slot: Arc<RequestSlot>,
    client_limit: Arc<Semaphore>,
}

impl ControlServer {
    pub fn new(listener: TcpListener, orchestrator: Arc<Orchestrator>, max_clients: usize) -> Self {
        Self {
            listener,
            orchestrator,
            slot: Arc::new(RequestSlot::new()),
            client_limit: Arc::new(Semaphore::new(max_clients.max(1))),
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept clients until shutdown is signalled.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            address = ?self.listener.local_addr().ok(),
            max_clients = self.client_limit.available_permits(),
            "Control server listening"
        );

        loop {
            // Permit first, then accept (backpressure)
            let permit = tokio::select! {
                permit = self.client_limit.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                _ = shutdown.recv() => break,
            };

            let (stream, peer) = tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept control client");
                        continue;
                    }
                },
                _ = shutdown.recv() => break,
            };

            tracing::debug!(peer_addr = %peer, "Control client connected");
            let orchestrator = Arc::clone(&self.orchestrator);
            let slot = Arc::clone(&self.slot);
            tokio::spawn(async move {
                if let Err(e) = serve_client(stream, &orchestrator, &slot).await {
                    tracing::debug!(peer_addr = %peer, error = %e, "Control client dropped");
                }
                drop(permit);
            });
        }

        self.slot.cancel_current();
        tracing::info!("Control server stopped");
    }
}

async fn serve_client(
    stream: TcpStream,
    orchestrator: &Orchestrator,
    slot: &RequestSlot,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<Command>(&line) {
            Ok(command) => handle(command, orchestrator, slot).await,
            Err(e) => Reply::error(format!("malformed command: {}", e)),
        };

        let mut out = serde_json::to_vec(&reply)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        out.push(b'\n');
        writer.write_all(&out).await?;
    }
    Ok(())
}

/// Execute one command.
pub async fn handle(command: Command, orchestrator: &Orchestrator, slot: &RequestSlot) -> Reply {
    match command {
        Command::Translate { text, backend } => {
            let mut options = TranslateOptions::default().with_cancel(slot.begin());
            if let Some(id) = backend {
                options = options.prefer(id);
            }
            orchestrator.translate_with(&text, options).await.into()
        }
        Command::Backends => Reply::Backends {
            backends: orchestrator.registry().snapshots(),
        },
        Command::Probe { backend } => {
            let registry = orchestrator.registry();
            let Some(entry) = registry.get(&backend) else {
                return Reply::error(format!("unknown backend '{}'", backend));
            };
            let prober = orchestrator.prober().cloned().unwrap_or_default();
            match prober.probe(&entry).await {
                Ok(latency) => {
                    registry.record_probe(&backend, latency);
                    Reply::Probed {
                        backend,
                        latency_ms: Some(latency.as_millis() as u64),
                        error: None,
                    }
                }
                Err(failure) => Reply::Probed {
                    backend,
                    latency_ms: None,
                    error: Some(failure.to_string()),
                },
            }
        }
    }
}

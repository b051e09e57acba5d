//! Single-instance lock.
//!
//! The running daemon holds a TCP listener on a fixed loopback address. A
//! second launch fails to bind and learns that a daemon is already there.

use std::io;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("another instance is already running on {0}")]
    AlreadyRunning(SocketAddr),

    #[error("failed to acquire instance lock on {addr}: {source}")]
    Io {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// Held for the daemon's lifetime; released when dropped.
#[derive(Debug)]
pub struct InstanceLock {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl InstanceLock {
    pub async fn acquire(addr: SocketAddr) -> Result<Self, InstanceError> {
        let listener = TcpListener::bind(addr).await.map_err(|e| match e.kind() {
            io::ErrorKind::AddrInUse => InstanceError::AlreadyRunning(addr),
            _ => InstanceError::Io { addr, source: e },
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| InstanceError::Io { addr, source: e })?;

        tracing::info!(address = %local_addr, "Instance lock acquired");
        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The bound socket, reused as the control listener.
    pub fn into_listener(self) -> TcpListener {
        self.listener
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_acquire_reports_running_instance() {
        let first = InstanceLock::acquire("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let addr = first.local_addr();

        let second = InstanceLock::acquire(addr).await;
        assert!(matches!(second, Err(InstanceError::AlreadyRunning(a)) if a == addr));

        drop(first);
        assert!(InstanceLock::acquire(addr).await.is_ok());
    }
}

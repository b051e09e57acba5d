//! Control socket client.

use std::net::SocketAddr;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::net::wire::{Command, Reply};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot reach translite at {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("control socket I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid message: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("daemon closed the connection without replying")]
    Closed,
}

/// Connection to a running daemon.
pub struct ControlClient {
    stream: BufReader<TcpStream>,
}

impl ControlClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ClientError::Connect { addr, source })?;
        Ok(Self {
            stream: BufReader::new(stream),
        })
    }

    /// Send one command and wait for its reply.
    pub async fn send(&mut self, command: &Command) -> Result<Reply, ClientError> {
        let mut out = serde_json::to_vec(command)?;
        out.push(b'\n');
        self.stream.get_mut().write_all(&out).await?;

        let mut line = String::new();
        if self.stream.read_line(&mut line).await? == 0 {
            return Err(ClientError::Closed);
        }
        Ok(serde_json::from_str(&line)?)
    }
}

//! Local control socket.
//!
//! # Data Flow
//! ```text
//! translite-cli / UI glue
//!     → client.rs (connect, one JSON line out, one JSON line back)
//!     → server.rs (accept loop, client limit, per-connection line loop)
//!     → wire.rs (Command / Reply)
//!     → Orchestrator / Registry / Prober
//! ```
//!
//! # Design Decisions
//! - Newline-delimited JSON, one reply per command
//! - Every translate command goes through one RequestSlot, so the newest
//!   selection supersedes an older one still in flight
//! - Bounded concurrent clients via semaphore

pub mod client;
pub mod server;
pub mod wire;

pub use client::{ClientError, ControlClient};
pub use server::ControlServer;
pub use wire::{AttemptReport, Command, Reply};

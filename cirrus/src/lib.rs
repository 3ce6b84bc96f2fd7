//! # Cirrus
//!
//! Generic, asynchronous RPC client surface for Rust.
//!
//! Cirrus provides:
//! - **One call operation**: `call(method, params)` over any connection,
//!   strongly typed in the result and parameter-sequence types
//! - **Write-once result handles**: `PendingResult` resolves exactly once
//!   to a value or an error, idempotent to repeated observation
//! - **A uniform error model**: `RpcError` with an open attribute bag,
//!   positional-template construction, and lossless re-signaling
//! - **A loopback connection** for tests and in-process services
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cirrus::{LoopbackConnection, RpcClient};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), cirrus::RpcError> {
//!     let conn = LoopbackConnection::new();
//!     conn.handle("echo", |params| Ok(params.get(0).cloned().unwrap_or_default()));
//!
//!     let client = RpcClient::new(Arc::new(conn));
//!
//!     // `call` returns immediately; await the handle when you need the result.
//!     let pending = client.call::<String, _>("echo", ["hi"])?;
//!     let reply = pending.await?;
//!     assert_eq!(reply, "hi");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Cirrus is composed of two crates:
//!
//! - [`cirrus-core`](cirrus_core) - Error model, pending-result handles,
//!   and the connection capability traits
//! - [`cirrus-client`](cirrus_client) - The `RpcClient` facade and the
//!   loopback connection

// Re-export core types
pub use cirrus_core::{
    AttrValue, Connect, Connection, FormatError, PendingResult, Resolver, RpcError, MESSAGE_KEY,
};

// Re-export the client surface
pub use cirrus_client::{LoopbackConnection, RpcClient};

// Re-export the raise! macro
pub use cirrus_core::raise;

/// Prelude module for convenient imports.
///
/// ```rust
/// use cirrus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{raise, Connection, PendingResult, RpcClient, RpcError};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

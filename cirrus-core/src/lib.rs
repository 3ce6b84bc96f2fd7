//! # cirrus-core
//!
//! Core types, traits, and error model for the Cirrus RPC client.
//!
//! This crate provides:
//! - The uniform error type (`RpcError`) with its attribute bag,
//!   positional-template construction, and the `raise!` macro
//! - The write-once future handle (`PendingResult`) and its `Resolver`
//! - The connection capability traits (`Connection`, `Connect`)

mod connection;
mod error;
mod pending;

pub use connection::{Connect, Connection};
pub use error::{AttrValue, FormatError, RpcError, MESSAGE_KEY};
pub use pending::{PendingResult, Resolver};

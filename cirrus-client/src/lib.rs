//! # cirrus-client
//!
//! Client facade for the Cirrus RPC framework.
//!
//! This crate provides:
//! - `RpcClient`, a thin strongly-typed call surface over any
//!   [`Connection`](cirrus_core::Connection)
//! - `LoopbackConnection`, an in-process connection backed by a method
//!   registry, useful for tests and local services

mod client;
mod loopback;

pub use client::RpcClient;
pub use loopback::LoopbackConnection;

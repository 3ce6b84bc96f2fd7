//! Connection capability traits.
//!
//! The client facade consumes exactly one capability from its transport
//! collaborator: a generic call primitive. Everything else about the
//! connection (framing, wire encoding, reconnection, request ordering) is
//! the implementor's concern.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::RpcError;
use crate::pending::PendingResult;

/// The minimal operation set a transport must expose to RPC clients.
///
/// Implementations own all dispatch policy: they serialize access to the
/// wire across concurrent callers, decide request ordering, and resolve
/// each returned handle exactly once. `call` must never block or suspend
/// the caller beyond enqueueing the request.
pub trait Connection: Send + Sync {
    /// Schedule one remote invocation of `method` with the given parameter
    /// sequence.
    ///
    /// Returns a pending handle for the eventual result. Failures detected
    /// before the request is accepted (not connected, parameters that
    /// cannot be marshalled) are returned synchronously as `Err` and no
    /// handle is produced; any failure after acceptance resolves the handle
    /// to its error state instead.
    ///
    /// Each call schedules exactly one invocation; callers get no
    /// deduplication or idempotency from this layer.
    fn call<R, P>(&self, method: &str, params: P) -> Result<PendingResult<R>, RpcError>
    where
        R: DeserializeOwned + Send + 'static,
        P: Serialize;
}

/// Connections that can be established from a host and port.
pub trait Connect: Connection + Sized {
    /// Establish a connection to `host:port`.
    ///
    /// Transport establishment failures surface as [`RpcError`].
    fn connect(host: &str, port: u16) -> impl Future<Output = Result<Self, RpcError>> + Send;
}

//! In-process connection backed by a method registry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use cirrus_core::{raise, Connection, PendingResult, RpcError};

type Handler = Arc<dyn Fn(Value) -> Result<Value, RpcError> + Send + Sync>;

/// A connection that dispatches calls to locally registered handlers.
///
/// Parameters are marshalled to JSON values and handed to the matching
/// handler on a spawned task, so `call` returns its handle before the
/// handler runs. Useful for tests and for services living in the same
/// process as their callers.
///
/// Requires a Tokio runtime to be current when `call` is invoked.
///
/// ## Example
///
/// ```rust,no_run
/// use cirrus_client::LoopbackConnection;
/// use cirrus_core::Connection;
///
/// # async fn run() -> Result<(), cirrus_core::RpcError> {
/// let conn = LoopbackConnection::new();
/// conn.handle("echo", |params| Ok(params.get(0).cloned().unwrap_or_default()));
///
/// let reply: String = conn.call("echo", ["hi"])?.await?;
/// assert_eq!(reply, "hi");
/// # Ok(())
/// # }
/// ```
pub struct LoopbackConnection {
    handlers: DashMap<String, Handler>,
    connected: AtomicBool,
}

impl LoopbackConnection {
    /// Create an empty, connected loopback.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
            connected: AtomicBool::new(true),
        }
    }

    /// Register a handler for `method`, replacing any previous one.
    ///
    /// The handler receives the marshalled parameter sequence and returns
    /// either a result value or the fault to resolve the caller's handle
    /// with.
    pub fn handle<F>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Result<Value, RpcError> + Send + Sync + 'static,
    {
        self.handlers.insert(method.into(), Arc::new(handler));
    }

    /// Whether the connection still accepts calls.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Stop accepting calls.
    ///
    /// Calls issued after this fail synchronously with a "not connected"
    /// error. Calls already dispatched still resolve.
    pub fn close(&self) {
        self.connected.store(false, Ordering::Release);
    }
}

impl Default for LoopbackConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection for LoopbackConnection {
    fn call<R, P>(&self, method: &str, params: P) -> Result<PendingResult<R>, RpcError>
    where
        R: DeserializeOwned + Send + 'static,
        P: Serialize,
    {
        if !self.is_connected() {
            raise!("not connected");
        }

        let params = match serde_json::to_value(params) {
            Ok(value) => value,
            Err(e) => raise!("cannot marshal parameters for %1%: %2%", method, e.to_string()),
        };

        let Some(handler) = self.handlers.get(method).map(|h| Arc::clone(h.value())) else {
            // Remote-side fault: the handle resolves to the error, the
            // call itself succeeds.
            return Ok(PendingResult::rejected(
                RpcError::from_message(format!("unknown method: {method}"))
                    .with_attr("method", method),
            ));
        };

        let (resolver, handle) = PendingResult::channel();
        let method = method.to_string();

        tokio::spawn(async move {
            tracing::debug!(method = %method, "dispatching loopback call");

            let delivered = match handler(params) {
                Ok(value) => match serde_json::from_value::<R>(value) {
                    Ok(result) => resolver.resolve(result),
                    Err(e) => resolver.reject(RpcError::from_message(format!(
                        "cannot unmarshal result of {method}: {e}"
                    ))),
                },
                Err(err) => resolver.reject(err.with_attr("method", method.as_str())),
            };

            if !delivered {
                tracing::warn!(method = %method, "call handle dropped before resolution");
            }
        });

        Ok(handle)
    }
}

//! The RPC client facade.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use cirrus_core::{Connect, Connection, PendingResult, RpcError};

/// Strongly-typed call surface over a shared connection.
///
/// The client holds a shared reference to its connection and is otherwise
/// stateless; cloning it is cheap and every clone issues calls over the
/// same connection. All transport policy (ordering, retries, timeouts,
/// wire serialization) lives in the connection.
///
/// ## Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use cirrus_client::{LoopbackConnection, RpcClient};
///
/// # async fn run() -> Result<(), cirrus_core::RpcError> {
/// let conn = LoopbackConnection::new();
/// conn.handle("echo", |params| Ok(params.get(0).cloned().unwrap_or_default()));
///
/// let client = RpcClient::new(Arc::new(conn));
/// let greeting: String = client.call("echo", ["hi"])?.await?;
/// assert_eq!(greeting, "hi");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RpcClient<C> {
    conn: Arc<C>,
}

impl<C> Clone for RpcClient<C> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

impl<C: Connection> RpcClient<C> {
    /// Create a client over an existing shared connection.
    #[must_use]
    pub fn new(conn: Arc<C>) -> Self {
        Self { conn }
    }

    /// Create a client that takes sole initial ownership of `conn`.
    #[must_use]
    pub fn from_connection(conn: C) -> Self {
        Self::new(Arc::new(conn))
    }

    /// The shared connection this client issues calls over.
    #[must_use]
    pub fn connection(&self) -> &Arc<C> {
        &self.conn
    }

    /// Invoke `method` remotely with the given parameter sequence.
    ///
    /// Forwards verbatim to the connection's call primitive with the same
    /// type parameters and returns its handle without inspection. The
    /// caller is responsible for matching `params` arity and types to the
    /// remote signature; no schema validation happens here.
    ///
    /// Dispatch failures are returned synchronously as `Err`; once a
    /// handle is returned, later failures resolve the handle to its error
    /// state instead. Each invocation schedules exactly one remote call.
    pub fn call<R, P>(&self, method: &str, params: P) -> Result<PendingResult<R>, RpcError>
    where
        R: DeserializeOwned + Send + 'static,
        P: Serialize,
    {
        self.conn.call(method, params)
    }
}

impl<C: Connect> RpcClient<C> {
    /// Establish a new connection to `host:port` and wrap it.
    ///
    /// Transport establishment failures surface as [`RpcError`].
    pub async fn connect(host: &str, port: u16) -> Result<Self, RpcError> {
        let conn = C::connect(host, port).await?;
        Ok(Self::from_connection(conn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cirrus_core::raise;
    use std::sync::Mutex;

    /// Echoes the parameter sequence back as the result, recording every
    /// method name it sees.
    #[derive(Debug)]
    struct EchoConnection {
        up: bool,
        calls: Mutex<Vec<String>>,
    }

    impl EchoConnection {
        fn new() -> Self {
            Self {
                up: true,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn down() -> Self {
            Self {
                up: false,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl Connection for EchoConnection {
        fn call<R, P>(&self, method: &str, params: P) -> Result<PendingResult<R>, RpcError>
        where
            R: DeserializeOwned + Send + 'static,
            P: Serialize,
        {
            if !self.up {
                raise!("not connected");
            }
            self.calls.lock().unwrap().push(method.to_string());

            let value =
                serde_json::to_value(params).map_err(|e| RpcError::from_message(e.to_string()))?;
            let result =
                serde_json::from_value(value).map_err(|e| RpcError::from_message(e.to_string()))?;
            Ok(PendingResult::resolved(result))
        }
    }

    impl Connect for EchoConnection {
        async fn connect(host: &str, port: u16) -> Result<Self, RpcError> {
            if port == 0 {
                raise!("cannot connect to %1%:%2%", host, port);
            }
            Ok(Self::new())
        }
    }

    #[tokio::test]
    async fn test_call_forwards_verbatim() {
        let client = RpcClient::from_connection(EchoConnection::new());

        let result: Vec<String> = client
            .call("echo", vec!["hi".to_string()])
            .unwrap()
            .await
            .unwrap();

        assert_eq!(result, vec!["hi".to_string()]);
        assert_eq!(
            *client.connection().calls.lock().unwrap(),
            vec!["echo".to_string()]
        );
    }

    #[test]
    fn test_dispatch_error_is_synchronous() {
        let client = RpcClient::from_connection(EchoConnection::down());

        let err = client.call::<(), _>("ping", ()).unwrap_err();
        assert_eq!(err.message(), "not connected");
    }

    #[test]
    fn test_each_call_schedules_one_invocation() {
        let client = RpcClient::from_connection(EchoConnection::new());

        let _ = client.call::<u32, _>("inc", 1u32).unwrap();
        let _ = client.call::<u32, _>("inc", 1u32).unwrap();

        assert_eq!(client.connection().calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_clone_shares_connection() {
        let client = RpcClient::from_connection(EchoConnection::new());
        let other = client.clone();

        assert!(Arc::ptr_eq(client.connection(), other.connection()));
    }

    #[tokio::test]
    async fn test_connect_wraps_new_connection() {
        let client = RpcClient::<EchoConnection>::connect("localhost", 9000)
            .await
            .unwrap();
        let pong: String = client.call("ping", "pong").unwrap().await.unwrap();
        assert_eq!(pong, "pong");
    }

    #[tokio::test]
    async fn test_connect_failure_surfaces_rpc_error() {
        let err = RpcClient::<EchoConnection>::connect("nowhere", 0)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "cannot connect to nowhere:0");
    }
}

//! End-to-end scenarios: a client facade over a shared loopback connection.

use std::sync::Arc;

use serde_json::Value;

use cirrus_client::{LoopbackConnection, RpcClient};
use cirrus_core::RpcError;

fn calculator() -> Arc<LoopbackConnection> {
    let conn = LoopbackConnection::new();

    conn.handle("echo", |params| {
        Ok(params.get(0).cloned().unwrap_or(Value::Null))
    });

    conn.handle("divide", |params| {
        let a = params.get(0).and_then(Value::as_i64).unwrap_or(0);
        let b = params.get(1).and_then(Value::as_i64).unwrap_or(0);
        if b == 0 {
            return RpcError::from_message(format!("division by zero: {a} / {b}")).rethrow();
        }
        Ok(Value::from(a / b))
    });

    Arc::new(conn)
}

#[tokio::test]
async fn echo_round_trip() {
    let client = RpcClient::new(calculator());

    let reply: String = client.call("echo", ["hi"]).unwrap().await.unwrap();
    assert_eq!(reply, "hi");
}

#[tokio::test]
async fn remote_fault_resolves_handle_to_error() {
    let client = RpcClient::new(calculator());

    let err = client
        .call::<i64, _>("divide", [1, 0])
        .unwrap()
        .await
        .unwrap_err();
    assert!(err.message().contains("division by zero"));
}

#[tokio::test]
async fn downed_connection_raises_synchronously() {
    let conn = calculator();
    conn.close();
    let client = RpcClient::new(conn);

    let err = client.call::<Value, _>("ping", ()).unwrap_err();
    assert_eq!(err.message(), "not connected");
}

#[tokio::test]
async fn call_does_not_block_on_the_round_trip() {
    let client = RpcClient::new(calculator());

    // Current-thread runtime: the handler cannot have run yet, so the
    // handle observed immediately after `call` must still be pending.
    let mut handle = client.call::<String, _>("echo", ["hi"]).unwrap();
    assert!(handle.try_resolve().is_none());

    assert_eq!(handle.wait().await, Ok(&"hi".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn facades_share_one_connection() {
    let conn = calculator();
    let alpha = RpcClient::new(Arc::clone(&conn));
    let beta = alpha.clone();

    let (a, b) = tokio::join!(
        async { alpha.call::<i64, _>("divide", [8, 2]).unwrap().await },
        async { beta.call::<String, _>("echo", ["beta"]).unwrap().await },
    );

    assert_eq!(a.unwrap(), 4);
    assert_eq!(b.unwrap(), "beta");
}

#[tokio::test]
async fn cancelled_call_never_observes_success() {
    let client = RpcClient::new(calculator());

    let mut handle = client.call::<String, _>("echo", ["late"]).unwrap();
    handle.cancel();

    let err = handle.wait().await.unwrap_err();
    assert_eq!(err.message(), "call cancelled");
}

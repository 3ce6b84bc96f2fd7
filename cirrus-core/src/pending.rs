//! Future-like handles for in-flight RPC calls.
//!
//! A connection creates a ([`Resolver`], [`PendingResult`]) pair per call,
//! keeps the resolver until the response (or failure) arrives, and hands the
//! handle to the caller. The handle is write-once: it reaches exactly one
//! terminal state, and repeated observation yields the same outcome.

use std::future::{Future, IntoFuture};
use std::pin::Pin;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::error::RpcError;

fn dropped_error() -> RpcError {
    RpcError::from_message("connection dropped before the call resolved")
}

fn cancelled_error() -> RpcError {
    RpcError::from_message("call cancelled")
}

/// Write end of a [`PendingResult`], held by the connection until the call
/// completes.
///
/// Resolution consumes the resolver, so a handle can only ever be resolved
/// once. Dropping a resolver without resolving rejects the handle with a
/// connection-dropped error rather than hanging the caller.
pub struct Resolver<R> {
    tx: oneshot::Sender<Result<R, RpcError>>,
}

impl<R> Resolver<R> {
    /// Resolve the handle with a value.
    ///
    /// Returns `false` if the caller cancelled or dropped the handle; the
    /// value is discarded in that case and can never be observed as success.
    pub fn resolve(self, value: R) -> bool {
        self.tx.send(Ok(value)).is_ok()
    }

    /// Resolve the handle with an error.
    ///
    /// Returns `false` if the caller cancelled or dropped the handle.
    pub fn reject(self, error: RpcError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }
}

#[derive(Debug)]
enum State<R> {
    Pending(oneshot::Receiver<Result<R, RpcError>>),
    Resolved(Result<R, RpcError>),
}

/// Handle for the eventual outcome of one in-flight call.
///
/// Created by a connection's call primitive; owned by the caller. The
/// caller may poll it ([`try_resolve`](Self::try_resolve)), wait on it
/// ([`wait`](Self::wait)), consume it as a future (`.await`), or cancel it.
/// Once terminal, the outcome is cached and every further observation sees
/// the same value or error.
#[derive(Debug)]
pub struct PendingResult<R> {
    state: State<R>,
}

impl<R> PendingResult<R> {
    /// Create a pending handle and its resolver.
    #[must_use]
    pub fn channel() -> (Resolver<R>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            Resolver { tx },
            Self {
                state: State::Pending(rx),
            },
        )
    }

    /// Create a handle already resolved with a value.
    #[must_use]
    pub fn resolved(value: R) -> Self {
        Self {
            state: State::Resolved(Ok(value)),
        }
    }

    /// Create a handle already resolved with an error.
    #[must_use]
    pub fn rejected(error: RpcError) -> Self {
        Self {
            state: State::Resolved(Err(error)),
        }
    }

    /// Whether a terminal state has been observed yet.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, State::Resolved(_))
    }

    /// Poll for the outcome without waiting.
    ///
    /// Returns `None` while the call is still in flight.
    pub fn try_resolve(&mut self) -> Option<Result<&R, &RpcError>> {
        if let State::Pending(rx) = &mut self.state {
            match rx.try_recv() {
                Ok(outcome) => self.state = State::Resolved(outcome),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Closed) => {
                    self.state = State::Resolved(Err(dropped_error()));
                }
            }
        }
        Some(self.outcome_ref())
    }

    /// Wait for the outcome.
    ///
    /// Suspends until the connection resolves the call, then returns a
    /// reference to the cached outcome. May be called repeatedly; every
    /// call after the first returns immediately with the same outcome.
    pub async fn wait(&mut self) -> Result<&R, &RpcError> {
        if let State::Pending(rx) = &mut self.state {
            let outcome = match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(dropped_error()),
            };
            self.state = State::Resolved(outcome);
        }
        self.outcome_ref()
    }

    /// Cancel the call.
    ///
    /// While pending, this drops the receiving end so a late resolution can
    /// never be observed as success; subsequent observation yields a
    /// cancellation error. After resolution this is a no-op.
    pub fn cancel(&mut self) {
        if let State::Pending(_) = self.state {
            self.state = State::Resolved(Err(cancelled_error()));
        }
    }

    fn outcome_ref(&self) -> Result<&R, &RpcError> {
        match &self.state {
            State::Resolved(Ok(value)) => Ok(value),
            State::Resolved(Err(error)) => Err(error),
            State::Pending(_) => unreachable!("outcome_ref called while pending"),
        }
    }
}

impl<R: Send + 'static> IntoFuture for PendingResult<R> {
    type Output = Result<R, RpcError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    /// Consume the handle, yielding the owned outcome.
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            match self.state {
                State::Pending(rx) => match rx.await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(dropped_error()),
                },
                State::Resolved(outcome) => outcome,
            }
        })
    }
}

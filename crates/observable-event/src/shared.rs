//! The shared result handle returned by `execute_event`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;

use crate::error::EventError;
use crate::lifecycle::ExecutionId;

pub(crate) type SharedComputation<O> = Shared<BoxFuture<'static, Result<O, EventError>>>;

/// Outcome of one event invocation, observable by any number of holders.
///
/// Clones poll the same underlying computation: awaiting ten clones runs the
/// event once and yields the same value (or the same [`EventError`]) ten
/// times. The dispatcher drives the computation itself, so dropping every
/// handle does not stop the lifecycle notifications.
pub struct SharedResult<O> {
    execution_id: ExecutionId,
    inner: SharedComputation<O>,
}

impl<O: Clone> SharedResult<O> {
    pub(crate) fn new(execution_id: ExecutionId, inner: SharedComputation<O>) -> Self {
        Self {
            execution_id,
            inner,
        }
    }

    /// Id shared with the lifecycle notifications of this invocation.
    pub fn execution_id(&self) -> ExecutionId {
        self.execution_id
    }

    /// The outcome, if the computation already resolved.
    pub fn peek(&self) -> Option<&Result<O, EventError>> {
        self.inner.peek()
    }
}

impl<O> Clone for SharedResult<O> {
    fn clone(&self) -> Self {
        Self {
            execution_id: self.execution_id,
            inner: self.inner.clone(),
        }
    }
}

impl<O: Clone> Future for SharedResult<O> {
    type Output = Result<O, EventError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl<O> fmt::Debug for SharedResult<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedResult")
            .field("execution_id", &self.execution_id)
            .finish_non_exhaustive()
    }
}

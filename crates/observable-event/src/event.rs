//! The event capability.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::channel::Channel;
use crate::dispatcher::EventDispatcher;
use crate::lifecycle::{ExecutionCompleted, ExecutionStart, ReceivedError, ReceivedOutput};
use crate::shared::SharedResult;

/// A self-describing unit of asynchronous work.
///
/// Every instance of one event type shares the same four lifecycle channels,
/// looked up by [`EVENT_TYPE`](Self::EVENT_TYPE).
///
/// ```ignore
/// #[derive(Debug, Clone)]
/// struct Login { username: String, pwd: String }
///
/// #[async_trait]
/// impl ObservableEvent for Login {
///     const EVENT_TYPE: &'static str = event_type!(Login);
///     type Output = String;
///
///     async fn processing(&self) -> anyhow::Result<String> {
///         Ok("success".into())
///     }
/// }
///
/// let mut rx = Login::success(&dispatcher).subscribe();
/// let output = Login { username: "user".into(), pwd: "pwd".into() }
///     .run(&dispatcher)
///     .await?;
/// ```
#[async_trait]
pub trait ObservableEvent: Clone + Debug + Send + Sync + 'static {
    /// Stable key for channel lookup. Must be unique per event type; see
    /// [`event_type!`](crate::event_type).
    const EVENT_TYPE: &'static str;

    type Output: Clone + Debug + Send + Sync + 'static;

    /// The work itself. Called exactly once per invocation.
    async fn processing(&self) -> anyhow::Result<Self::Output>;

    /// Executes this event on `dispatcher`.
    fn run(self, dispatcher: &EventDispatcher) -> SharedResult<Self::Output> {
        dispatcher.execute_event(self)
    }

    fn start(dispatcher: &EventDispatcher) -> Channel<ExecutionStart<Self>> {
        dispatcher.start_channel::<Self>()
    }

    fn success(dispatcher: &EventDispatcher) -> Channel<ReceivedOutput<Self>> {
        dispatcher.success_channel::<Self>()
    }

    fn failure(dispatcher: &EventDispatcher) -> Channel<ReceivedError<Self>> {
        dispatcher.failure_channel::<Self>()
    }

    fn completed(dispatcher: &EventDispatcher) -> Channel<ExecutionCompleted<Self>> {
        dispatcher.completed_channel::<Self>()
    }
}

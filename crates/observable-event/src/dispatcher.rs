//! Event execution and lifecycle fan-out.
//!
//! ```text
//! execute_event(e)
//!     │
//!     ├─► e.processing() ──► shared computation ──┬─► log echo task (optional)
//!     │                                           │
//!     ├─► publish ExecutionStart                  ├─► lifecycle publisher task
//!     │                                           │     ├─► ReceivedOutput / ReceivedError
//!     │                                           │     └─► ExecutionCompleted
//!     │                                           │
//!     └─► return SharedResult ◄───────────────────┘
//! ```
//!
//! The computation runs once no matter how many observers exist. The
//! lifecycle publisher task drives it, so invocations whose handle is dropped
//! still complete.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::channel::Channel;
use crate::error::EventError;
use crate::event::ObservableEvent;
use crate::lifecycle::{
    EventStatus, ExecutionCompleted, ExecutionId, ExecutionStart, ReceivedError, ReceivedOutput,
};
use crate::registry::ChannelRegistry;
use crate::shared::{SharedComputation, SharedResult};
use crate::tracker::InflightTracker;

struct Inner {
    show_log: AtomicBool,
    start: ChannelRegistry,
    success: ChannelRegistry,
    failure: ChannelRegistry,
    completed: ChannelRegistry,
    inflight: InflightTracker,
    runtime: Option<Handle>,
}

/// Runs events and publishes their lifecycle.
///
/// Cheap to clone; clones share registries, channels and bookkeeping. Pass
/// it to whatever triggers events and whatever listens to them.
#[derive(Clone)]
pub struct EventDispatcher {
    inner: Arc<Inner>,
}

impl EventDispatcher {
    /// Dispatcher with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Executes `event` and returns a handle to its shared outcome.
    ///
    /// Publishes [`ExecutionStart`] before returning. Once the computation
    /// resolves, publishes [`ReceivedOutput`] or [`ReceivedError`] and then
    /// the matching [`ExecutionCompleted`].
    ///
    /// # Panics
    ///
    /// Panics if no runtime handle was configured and this is called outside
    /// a tokio runtime.
    pub fn execute_event<E: ObservableEvent>(&self, event: E) -> SharedResult<E::Output> {
        let execution_id = ExecutionId::new();

        let computation: SharedComputation<E::Output> = {
            let event = event.clone();
            async move { event.processing().await.map_err(EventError::new) }
                .boxed()
                .shared()
        };

        if self.show_log() {
            self.log_event(&event, execution_id, computation.clone());
        }

        self.start_channel::<E>().publish(ExecutionStart {
            execution_id,
            event: event.clone(),
        });

        let success = self.success_channel::<E>();
        let failure = self.failure_channel::<E>();
        let completed = self.completed_channel::<E>();
        let guard = self.inner.inflight.enter();
        let publisher = computation.clone();

        self.spawn(async move {
            let _guard = guard;
            match publisher.await {
                Ok(output) => {
                    let notification = ReceivedOutput {
                        execution_id,
                        event,
                        output,
                    };
                    success.publish(notification.clone());
                    completed.publish(ExecutionCompleted::from(notification));
                }
                Err(error) => {
                    let notification = ReceivedError {
                        execution_id,
                        event,
                        error,
                    };
                    failure.publish(notification.clone());
                    completed.publish(ExecutionCompleted::from(notification));
                }
            }
        });

        SharedResult::new(execution_id, computation)
    }

    fn log_event<E: ObservableEvent>(
        &self,
        event: &E,
        execution_id: ExecutionId,
        computation: SharedComputation<E::Output>,
    ) {
        info!(event_type = E::EVENT_TYPE, %execution_id, ?event, "event will execute");

        let event = event.clone();
        let guard = self.inner.inflight.enter();
        self.spawn(async move {
            let _guard = guard;
            match computation.await {
                Ok(_) => {
                    info!(event_type = E::EVENT_TYPE, %execution_id, ?event, "event executed successfully");
                }
                Err(error) => {
                    warn!(event_type = E::EVENT_TYPE, %execution_id, ?event, %error, "event execution failed");
                }
            }
        });
    }

    fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        match &self.inner.runtime {
            Some(handle) => {
                handle.spawn(task);
            }
            None => {
                tokio::spawn(task);
            }
        }
    }

    pub fn start_channel<E: ObservableEvent>(&self) -> Channel<ExecutionStart<E>> {
        self.inner.start.channel_for()
    }

    pub fn success_channel<E: ObservableEvent>(&self) -> Channel<ReceivedOutput<E>> {
        self.inner.success.channel_for()
    }

    pub fn failure_channel<E: ObservableEvent>(&self) -> Channel<ReceivedError<E>> {
        self.inner.failure.channel_for()
    }

    pub fn completed_channel<E: ObservableEvent>(&self) -> Channel<ExecutionCompleted<E>> {
        self.inner.completed.channel_for()
    }

    /// The registry holding every channel of `status`.
    pub fn registry(&self, status: EventStatus) -> &ChannelRegistry {
        match status {
            EventStatus::Start => &self.inner.start,
            EventStatus::Success => &self.inner.success,
            EventStatus::Failure => &self.inner.failure,
            EventStatus::Completed => &self.inner.completed,
        }
    }

    pub fn show_log(&self) -> bool {
        self.inner.show_log.load(Ordering::Relaxed)
    }

    /// Toggles the log echo for invocations started after this call.
    pub fn set_show_log(&self, show_log: bool) {
        self.inner.show_log.store(show_log, Ordering::Relaxed);
    }

    /// Number of internal subscriptions still waiting on their invocation.
    pub fn in_flight(&self) -> usize {
        self.inner.inflight.in_flight()
    }

    /// Resolves once every internal subscription has finished publishing.
    pub async fn wait_idle(&self) {
        self.inner.inflight.wait_idle().await
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("show_log", &self.show_log())
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

/// Builder for [`EventDispatcher`].
#[derive(Debug, Clone)]
pub struct DispatcherBuilder {
    show_log: bool,
    runtime: Option<Handle>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            show_log: true,
            runtime: None,
        }
    }

    /// Echo start, success and failure through `tracing` (default: on).
    pub fn show_log(mut self, show_log: bool) -> Self {
        self.show_log = show_log;
        self
    }

    /// Spawn subscriber tasks on `handle` instead of the caller's runtime.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> EventDispatcher {
        EventDispatcher {
            inner: Arc::new(Inner {
                show_log: AtomicBool::new(self.show_log),
                start: ChannelRegistry::new(EventStatus::Start),
                success: ChannelRegistry::new(EventStatus::Success),
                failure: ChannelRegistry::new(EventStatus::Failure),
                completed: ChannelRegistry::new(EventStatus::Completed),
                inflight: InflightTracker::new(),
                runtime: self.runtime,
            }),
        }
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

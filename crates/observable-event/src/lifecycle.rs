//! Lifecycle notifications.
//!
//! One invocation of an event produces, in order:
//!
//! ```text
//! ExecutionStart ──► ReceivedOutput ──┐
//!        │                            ├──► ExecutionCompleted
//!        └─────────► ReceivedError ───┘
//! ```
//!
//! Exactly one `ExecutionStart`, exactly one of `ReceivedOutput` /
//! `ReceivedError`, and exactly one `ExecutionCompleted` carrying the same
//! payload as the preceding success or failure.

use std::fmt;

use uuid::Uuid;

use crate::error::EventError;
use crate::event::ObservableEvent;

/// Phase of one event invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStatus {
    Start,
    Success,
    Failure,
    Completed,
}

impl EventStatus {
    /// All statuses in publication order.
    pub const ALL: [EventStatus; 4] = [
        EventStatus::Start,
        EventStatus::Success,
        EventStatus::Failure,
        EventStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Start => "start",
            EventStatus::Success => "success",
            EventStatus::Failure => "failure",
            EventStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one invocation of an event.
///
/// Every notification of the same invocation carries the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecutionId(Uuid);

impl ExecutionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Common view over the four notification shapes.
pub trait LifecycleNotification: Clone + Send + Sync + 'static {
    type Event: ObservableEvent;

    /// The status every value of this shape carries.
    const STATUS: EventStatus;

    fn status(&self) -> EventStatus {
        Self::STATUS
    }

    fn event(&self) -> &Self::Event;

    fn execution_id(&self) -> ExecutionId;
}

/// The event is about to run.
#[derive(Debug, Clone)]
pub struct ExecutionStart<E: ObservableEvent> {
    pub execution_id: ExecutionId,
    pub event: E,
}

/// The event's computation produced a value.
#[derive(Debug, Clone)]
pub struct ReceivedOutput<E: ObservableEvent> {
    pub execution_id: ExecutionId,
    pub event: E,
    pub output: E::Output,
}

/// The event's computation failed.
#[derive(Debug, Clone)]
pub struct ReceivedError<E: ObservableEvent> {
    pub execution_id: ExecutionId,
    pub event: E,
    pub error: EventError,
}

/// The invocation is over, with whichever outcome was published before.
#[derive(Debug, Clone)]
pub struct ExecutionCompleted<E: ObservableEvent> {
    pub execution_id: ExecutionId,
    pub event: E,
    pub result: Result<E::Output, EventError>,
}

impl<E: ObservableEvent> ExecutionCompleted<E> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn output(&self) -> Option<&E::Output> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&EventError> {
        self.result.as_ref().err()
    }
}

impl<E: ObservableEvent> From<ReceivedOutput<E>> for ExecutionCompleted<E> {
    fn from(success: ReceivedOutput<E>) -> Self {
        Self {
            execution_id: success.execution_id,
            event: success.event,
            result: Ok(success.output),
        }
    }
}

impl<E: ObservableEvent> From<ReceivedError<E>> for ExecutionCompleted<E> {
    fn from(failure: ReceivedError<E>) -> Self {
        Self {
            execution_id: failure.execution_id,
            event: failure.event,
            result: Err(failure.error),
        }
    }
}

macro_rules! impl_notification {
    ($shape:ident, $status:expr) => {
        impl<E: ObservableEvent> LifecycleNotification for $shape<E> {
            type Event = E;

            const STATUS: EventStatus = $status;

            fn event(&self) -> &E {
                &self.event
            }

            fn execution_id(&self) -> ExecutionId {
                self.execution_id
            }
        }
    };
}

impl_notification!(ExecutionStart, EventStatus::Start);
impl_notification!(ReceivedOutput, EventStatus::Success);
impl_notification!(ReceivedError, EventStatus::Failure);
impl_notification!(ExecutionCompleted, EventStatus::Completed);

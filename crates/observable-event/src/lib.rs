//! # Observable Event
//!
//! A type-safe event dispatcher: events describe a unit of asynchronous work,
//! the dispatcher runs that work once and broadcasts its lifecycle on
//! per-event-type channels.
//!
//! ## Core Concepts
//!
//! - [`ObservableEvent`] = a value that knows how to compute its `Output`
//! - [`EventDispatcher`] = runs events and owns every lifecycle channel
//! - [`Channel`] = a broadcast stream of one notification shape for one event type
//!
//! Producers and consumers never reference each other. Both only name the
//! event type:
//!
//! ```text
//! Producer                                   Consumers
//!    │                                          ▲   ▲
//!    ▼ event.run(&dispatcher)                   │   │ subscribe()
//! EventDispatcher                               │   │
//!    │                                          │   │
//!    ├─► ExecutionStart ─────► Login::start ────┘   │
//!    │                                              │
//!    ├─► ReceivedOutput ─────► Login::success ──────┤
//!    │   or ReceivedError ───► Login::failure ──────┤
//!    │                                              │
//!    └─► ExecutionCompleted ─► Login::completed ────┘
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Exactly once** - the computation runs once per invocation, however many observers
//! 2. **Ordered lifecycle** - Start, then Success or Failure, then Completed
//! 3. **Coupled payloads** - Completed carries the value published by Success/Failure
//! 4. **One channel per key** - each registry creates at most one channel per event type
//!
//! ## Guarantees
//!
//! - **In-memory only**: channels live as long as the dispatcher
//! - **No replay**: subscribe before running the event to see its notifications
//! - **No loss**: a subscriber receives every notification published while it is alive
//! - **Fire-and-forget**: notifications are published even if the result handle is dropped
//!
//! ## Example
//!
//! ```ignore
//! use observable_event::{async_trait, event_type, EventDispatcher, ObservableEvent};
//!
//! #[derive(Debug, Clone)]
//! struct Login {
//!     username: String,
//!     pwd: String,
//! }
//!
//! #[async_trait]
//! impl ObservableEvent for Login {
//!     const EVENT_TYPE: &'static str = event_type!(Login);
//!     type Output = String;
//!
//!     async fn processing(&self) -> anyhow::Result<String> {
//!         Ok("success".into())
//!     }
//! }
//!
//! let dispatcher = EventDispatcher::new();
//!
//! // Anywhere else, knowing only the event type
//! let mut logins = Login::success(&dispatcher).subscribe();
//!
//! let output = Login { username: "user".into(), pwd: "pwd".into() }
//!     .run(&dispatcher)
//!     .await?;
//!
//! let seen = logins.recv().await.expect("dispatcher alive");
//! assert_eq!(seen.output, output);
//! ```
//!
//! ## What This Is Not
//!
//! Not a task scheduler (no priority, retry or cancellation), not a message
//! broker (nothing is persisted), not an RPC layer (output types are fixed
//! per event type).

// Core modules
mod channel;
mod dispatcher;
mod error;
mod event;
mod lifecycle;
mod macros;
mod registry;
mod shared;
mod tracker;


// Stress tests (test-only)
#[cfg(test)]
mod stress_tests;

// Re-export the event capability
pub use event::ObservableEvent;

// Re-export lifecycle types
pub use lifecycle::{
    EventStatus, ExecutionCompleted, ExecutionId, ExecutionStart, LifecycleNotification,
    ReceivedError, ReceivedOutput,
};

// Re-export error types
pub use error::{DispatchError, EventError};

// Re-export channel types
pub use channel::{Channel, Receiver};
pub use registry::ChannelRegistry;

// Re-export dispatcher types
pub use dispatcher::{DispatcherBuilder, EventDispatcher};
pub use shared::SharedResult;
pub use tracker::{InflightGuard, InflightTracker};

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio::sync::mpsc::error::TryRecvError;

//! Error types.
//!
//! Two classes exist:
//! - [`EventError`]: whatever an event's own computation failed with. This is
//!   data, routed to the failure and completed channels.
//! - [`DispatchError`]: misuse of the dispatcher itself.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::lifecycle::EventStatus;

/// A computation error, shared between every observer of one invocation.
///
/// `anyhow::Error` is not `Clone`, but a failed invocation is delivered to the
/// failure channel, the completed channel and every holder of the result
/// handle. The error is therefore kept behind an `Arc`.
#[derive(Clone)]
pub struct EventError(Arc<anyhow::Error>);

impl EventError {
    /// Wrap a computation error.
    pub fn new(error: anyhow::Error) -> Self {
        Self(Arc::new(error))
    }

    /// Borrow the underlying error.
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }

    /// Attempt to view the root error as a concrete type.
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.0.downcast_ref::<T>()
    }

    /// Returns true if both values are the same shared error.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<anyhow::Error> for EventError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(error)
    }
}

impl fmt::Debug for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl std::error::Error for EventError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.chain().nth(1)
    }
}

/// Errors raised by the dispatcher machinery.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Two distinct Rust types declared the same `EVENT_TYPE` key.
    ///
    /// Sharing the key would silently merge their notifications, so the
    /// second type is refused.
    #[error("event type key `{key}` is already used by `{registered}`, refused for `{requested}`")]
    EventTypeCollision {
        key: &'static str,
        registered: &'static str,
        requested: &'static str,
    },

    /// A notification shape was requested from a registry of another status.
    #[error("registry for `{status}` notifications cannot hold `{requested}`")]
    NotificationMismatch {
        status: EventStatus,
        requested: &'static str,
    },
}

/// Identity of the Rust type that claimed a registry key.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TypeTag {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
}

impl TypeTag {
    pub(crate) fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }
}

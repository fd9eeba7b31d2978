//! Per-status channel registry.
//!
//! A [`ChannelRegistry`] owns every channel of one lifecycle status, keyed by
//! the event type's `EVENT_TYPE` string. Channels are created on first request
//! and live as long as the registry.
//!
//! The check-or-create sequence runs under the `DashMap` shard lock for the
//! key, so two first-time requests racing for the same key always end up with
//! the same channel.

use std::any::Any;

use dashmap::DashMap;

use crate::channel::Channel;
use crate::error::{DispatchError, TypeTag};
use crate::event::ObservableEvent;
use crate::lifecycle::{EventStatus, LifecycleNotification};

struct Slot {
    owner: TypeTag,
    channel: Box<dyn Any + Send + Sync>,
}

/// Lazily created channels for one lifecycle status.
pub struct ChannelRegistry {
    status: EventStatus,
    channels: DashMap<&'static str, Slot>,
}

impl ChannelRegistry {
    pub fn new(status: EventStatus) -> Self {
        Self {
            status,
            channels: DashMap::new(),
        }
    }

    pub fn status(&self) -> EventStatus {
        self.status
    }

    /// Number of event types that have a channel here.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Returns the channel for `N`'s event type, creating it if absent.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::EventTypeCollision`] if a different event type
    ///   already claimed the same `EVENT_TYPE` key.
    /// - [`DispatchError::NotificationMismatch`] if `N` does not carry this
    ///   registry's status.
    pub fn try_channel_for<N>(&self) -> Result<Channel<N>, DispatchError>
    where
        N: LifecycleNotification,
    {
        if N::STATUS != self.status {
            return Err(DispatchError::NotificationMismatch {
                status: self.status,
                requested: std::any::type_name::<N>(),
            });
        }

        let key = <N::Event as ObservableEvent>::EVENT_TYPE;
        let requested = TypeTag::of::<N::Event>();

        let slot = self.channels.entry(key).or_insert_with(|| {
            tracing::debug!(event_type = key, status = %self.status, "creating lifecycle channel");
            Slot {
                owner: requested,
                channel: Box::new(Channel::<N>::new()),
            }
        });

        if slot.owner.id != requested.id {
            return Err(DispatchError::EventTypeCollision {
                key,
                registered: slot.owner.name,
                requested: requested.name,
            });
        }

        let channel = slot.channel.downcast_ref::<Channel<N>>().cloned();
        channel.ok_or(DispatchError::NotificationMismatch {
            status: self.status,
            requested: std::any::type_name::<N>(),
        })
    }

    /// Returns the channel for `N`'s event type, creating it if absent.
    ///
    /// # Panics
    ///
    /// Panics where [`try_channel_for`](Self::try_channel_for) would return an
    /// error. Both cases are programming errors in the event definitions.
    pub fn channel_for<N>(&self) -> Channel<N>
    where
        N: LifecycleNotification,
    {
        match self.try_channel_for::<N>() {
            Ok(channel) => channel,
            Err(err) => panic!("{err}"),
        }
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("status", &self.status)
            .field("channels", &self.channels.len())
            .finish()
    }
}

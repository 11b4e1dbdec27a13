//! Completion events
//!
//! Every command that reaches its target, whether it succeeds or is rejected,
//! is announced on a [`CompletionBus`]. Listeners run synchronously, in the
//! order they subscribed, before the dispatching call returns.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use serde::Serialize;
use tracing::trace;

use crate::error::Result;

use super::command::ScopeLevel;
use super::result::CommandResult;

/// Payload delivered to completion listeners
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandCompleted {
    /// Command name or rendered command document
    pub command: String,

    /// Scope the completion is reported at
    pub scope: ScopeLevel,

    /// Normalized reply
    pub result: CommandResult,

    /// Time spent waiting on the target
    pub elapsed_ms: u64,
}

type Listener = Arc<dyn Fn(&CommandCompleted) -> Result<()> + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    entries: RwLock<BTreeMap<u64, Listener>>,
}

/// Subscribable completion notification
///
/// Clones share the same listener list.
#[derive(Clone, Default)]
pub struct CompletionBus {
    listeners: Arc<Listeners>,
}

/// Registration handle returned by [`CompletionBus::subscribe`]
///
/// Dropping the handle removes the listener.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl CompletionBus {
    /// Create a bus with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    ///
    /// Listeners are invoked in registration order. An error returned by a
    /// listener stops delivery and is handed to the dispatching caller.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CommandCompleted) -> Result<()> + Send + Sync + 'static,
    {
        let id = self.listeners.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(listener));
        trace!("Subscribed completion listener #{}", id);

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver an event to every listener registered at the time of the call
    ///
    /// # Returns
    /// * `Result<()>` - The first listener error, if any
    pub fn publish(&self, event: &CommandCompleted) -> Result<()> {
        // Snapshot so listeners may (un)subscribe while being notified
        let snapshot: Vec<Listener> = self
            .listeners
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        trace!(
            "Publishing completion of '{}' to {} listener(s)",
            event.command,
            snapshot.len()
        );

        for listener in snapshot {
            listener(event)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for CompletionBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Subscription {
    /// Keep the listener registered for as long as the bus lives
    pub fn detach(self) {
        std::mem::forget(self);
    }

    /// Remove the listener now
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .entries
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
            trace!("Unsubscribed completion listener #{}", self.id);
        }
    }
}

//! # Subscription handles.
//!
//! [`Subscription`] identifies one attachment of a task to an [`ActionEvent`](super::ActionEvent);
//! [`Linkage`] groups the subscriptions created by one
//! [`TaskManager::link`](crate::TaskManager::link) call so they can be detached together.
//!
//! Handles hold a weak reference to the subscriber list: dropping the event does not
//! wait for outstanding handles, and unsubscribing from a dropped event is a no-op.
//! Dropping a handle does **not** unsubscribe.

use std::sync::Weak;

use tokio::sync::RwLock;

use super::action::Slot;

/// One task attached to one action event.
pub struct Subscription<T> {
    id: u64,
    slots: Weak<RwLock<Vec<Slot<T>>>>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(id: u64, slots: Weak<RwLock<Vec<Slot<T>>>>) -> Self {
        Self { id, slots }
    }

    /// Process-unique subscription id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Detaches the task. Returns `false` if it was already detached or the event is gone.
    pub async fn unsubscribe(self) -> bool {
        let Some(slots) = self.slots.upgrade() else {
            return false;
        };
        let mut slots = slots.write().await;
        match slots.iter().position(|s| s.id == self.id) {
            Some(pos) => {
                slots.remove(pos);
                true
            }
            None => false,
        }
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Subscriptions produced by one link call.
#[derive(Debug)]
pub struct Linkage<T> {
    subscriptions: Vec<Subscription<T>>,
}

impl<T> Linkage<T> {
    /// Linkage with no subscriptions (nothing was registered for the action).
    pub fn empty() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, sub: Subscription<T>) {
        self.subscriptions.push(sub);
    }

    /// Number of attached tasks.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Ids of the attached subscriptions, in subscription order.
    pub fn ids(&self) -> Vec<u64> {
        self.subscriptions.iter().map(Subscription::id).collect()
    }

    /// Detaches every task; returns how many were still attached.
    pub async fn unlink(self) -> usize {
        let mut detached = 0;
        for sub in self.subscriptions {
            if sub.unsubscribe().await {
                detached += 1;
            }
        }
        detached
    }
}

//! Add/remove notifications.
//!
//! A subscription pairs a key with a listener. Listeners bound to a subscriber hold only a
//! [`Weak`] back-reference to it: once the subscriber is dropped the listener stops firing and is
//! pruned from the list on the next dispatch. Listeners created through
//! [`Registry::subscribe`](crate::Registry::subscribe) are owned by a [`Subscription`] guard
//! instead and go away when the guard is dropped.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::Key;

/// Type-erased shared reference to a registered object.
pub type AnyRef = Arc<dyn Any + Send + Sync>;

/// Identifies one subscription within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub(crate) trait Listener: Send + Sync {
    /// `false` once the subscriber behind this listener is gone.
    fn is_alive(&self) -> bool;

    /// Returns whether the callback actually ran.
    fn deliver(&self, payload: Option<&AnyRef>) -> bool;
}

/// A payload of the wrong type reaches typed callbacks as `None`.
fn narrow<T: Send + Sync + 'static>(payload: Option<&AnyRef>) -> Option<Arc<T>> {
    payload.cloned().and_then(|any| any.downcast::<T>().ok())
}

pub(crate) struct ObjectSlot<T, S> {
    pub(crate) subscriber: Weak<S>,
    pub(crate) slot: fn(&S, Option<Arc<T>>),
}

impl<T, S> Listener for ObjectSlot<T, S>
where
    T: Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    fn is_alive(&self) -> bool {
        self.subscriber.strong_count() > 0
    }

    fn deliver(&self, payload: Option<&AnyRef>) -> bool {
        let Some(subscriber) = self.subscriber.upgrade() else {
            return false;
        };
        (self.slot)(&subscriber, narrow::<T>(payload));
        true
    }
}

pub(crate) struct SignalSlot<S> {
    pub(crate) subscriber: Weak<S>,
    pub(crate) slot: fn(&S),
}

impl<S: Send + Sync + 'static> Listener for SignalSlot<S> {
    fn is_alive(&self) -> bool {
        self.subscriber.strong_count() > 0
    }

    fn deliver(&self, _payload: Option<&AnyRef>) -> bool {
        let Some(subscriber) = self.subscriber.upgrade() else {
            return false;
        };
        (self.slot)(&subscriber);
        true
    }
}

pub(crate) type TypedCallback<T> = Box<dyn Fn(Option<Arc<T>>) + Send + Sync>;

pub(crate) struct SubscriberFn<T, S> {
    pub(crate) subscriber: Weak<S>,
    pub(crate) callback: TypedCallback<T>,
}

impl<T, S> Listener for SubscriberFn<T, S>
where
    T: Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    fn is_alive(&self) -> bool {
        self.subscriber.strong_count() > 0
    }

    fn deliver(&self, payload: Option<&AnyRef>) -> bool {
        // Hold the subscriber for the duration of the call.
        let Some(_subscriber) = self.subscriber.upgrade() else {
            return false;
        };
        (self.callback)(narrow::<T>(payload));
        true
    }
}

pub(crate) struct GuardedFn<T> {
    pub(crate) callback: TypedCallback<T>,
}

impl<T: Send + Sync + 'static> Listener for GuardedFn<T> {
    fn is_alive(&self) -> bool {
        true
    }

    fn deliver(&self, payload: Option<&AnyRef>) -> bool {
        (self.callback)(narrow::<T>(payload));
        true
    }
}

struct Registration {
    id: SubscriptionId,
    key: Key,
    listener: Arc<dyn Listener>,
}

/// Ordered list of subscriptions.
///
/// Removed listeners are always dropped after the lock is released, since dropping a user
/// closure may run arbitrary code.
#[derive(Default)]
pub(crate) struct SubscriptionList {
    next_id: AtomicU64,
    entries: Mutex<Vec<Registration>>,
}

impl SubscriptionList {
    fn lock(&self) -> MutexGuard<'_, Vec<Registration>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub(crate) fn insert(&self, key: Key, listener: Arc<dyn Listener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Registration { id, key, listener });
        id
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut entries = self.lock();
            entries
                .iter()
                .position(|r| r.id == id)
                .map(|index| entries.remove(index))
        };
        removed.is_some()
    }

    /// Live listeners for `key` in registration order. Dead subscriptions are pruned first.
    pub(crate) fn active(&self, key: &Key) -> Vec<Arc<dyn Listener>> {
        let (listeners, dead) = {
            let mut entries = self.lock();
            let (live, dead): (Vec<_>, Vec<_>) = std::mem::take(&mut *entries)
                .into_iter()
                .partition(|r| r.listener.is_alive());
            *entries = live;
            let listeners = entries
                .iter()
                .filter(|r| &r.key == key)
                .map(|r| Arc::clone(&r.listener))
                .collect::<Vec<_>>();
            (listeners, dead)
        };
        drop(dead);
        listeners
    }

    pub(crate) fn count(&self, key: &Key) -> usize {
        self.active(key).len()
    }

    pub(crate) fn clear(&self) {
        let entries = std::mem::take(&mut *self.lock());
        drop(entries);
    }
}

/// Guard for a subscription made with [`Registry::subscribe`](crate::Registry::subscribe).
///
/// Dropping the guard unsubscribes. The guard does not keep the registry alive.
#[derive(Debug)]
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: SubscriptionId,
    list: Weak<SubscriptionList>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, list: &Arc<SubscriptionList>) -> Self {
        Self {
            id,
            list: Arc::downgrade(list),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Releases the guard without unsubscribing. The subscription then lives as long as the
    /// registry, or until [`Registry::unsubscribe`](crate::Registry::unsubscribe) is called.
    pub fn detach(mut self) -> SubscriptionId {
        self.list = Weak::new();
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(list) = self.list.upgrade() {
            list.remove(self.id);
        }
    }
}

impl std::fmt::Debug for SubscriptionList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionList")
            .field("len", &self.lock().len())
            .finish()
    }
}

//! The registry: keyed object storage, factories and add/remove notifications.
//!
//! # Examples
//!
//! ```
//! use dependency_pool::Registry;
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//! registry.add("Hello, World!".to_string());
//!
//! let message: Arc<String> = registry.get().unwrap();
//! assert_eq!(&*message, "Hello, World!");
//! ```

use std::any::type_name;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace};

use crate::construct::{Creator, Dependencies};
use crate::notify::{GuardedFn, Listener, ObjectSlot, SignalSlot, SubscriberFn, SubscriptionList};
use crate::{AnyRef, Key, RegistryError, RegistryEvent, Subscription, SubscriptionId};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives every [`RegistryEvent`] the registry emits. It runs without any
/// registry lock held, so it may call back into the registry.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// Keyed store of shared objects and factories, with add/remove notifications.
///
/// The registry holds the owning reference of every object added to it until the object is
/// removed or displaced. Callers get shared [`Arc`] handles.
///
/// No registry lock is held while factories, notification callbacks or the trace callback run.
#[derive(Default)]
pub struct Registry {
    entries: Mutex<HashMap<Key, AnyRef>>,
    creators: Mutex<HashMap<Key, AnyRef>>,
    // Keys whose removal is notifying subscribers right now.
    removing: Mutex<HashSet<Key>>,
    subscriptions: Arc<SubscriptionList>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning only happens if a user callback panicked up the stack. The maps are never left
    // half-updated.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<Key, AnyRef>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_removing(&self) -> MutexGuard<'_, HashSet<Key>> {
        self.removing.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_creators(&self) -> MutexGuard<'_, HashMap<Key, AnyRef>> {
        self.creators.lock().unwrap_or_else(|p| p.into_inner())
    }

    // ---------------------------------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------------------------------

    /// Sets a tracing callback invoked for every registry operation.
    ///
    /// Replaces any previous callback.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clears the tracing callback. Registered objects are not affected.
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    fn emit_event(&self, event: &RegistryEvent) {
        let callback = self
            .trace
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Store
    // ---------------------------------------------------------------------------------------------

    /// Stores `object` under the default key of `T` and notifies subscribers of that key.
    ///
    /// Returns the displaced occupant, if any. The registry drops its own reference to it; the
    /// caller decides whether the returned handle is kept or released.
    pub fn add<T: Send + Sync + 'static>(&self, object: T) -> Option<AnyRef> {
        self.add_arc(Arc::new(object))
    }

    /// Like [`Registry::add`], for an object that is already shared.
    pub fn add_arc<T: Send + Sync + 'static>(&self, object: Arc<T>) -> Option<AnyRef> {
        self.add_arc_with_key(object, Key::of::<T>())
    }

    /// Stores `object` under an explicit key.
    pub fn add_with_key<T: Send + Sync + 'static>(
        &self,
        object: T,
        key: impl Into<Key>,
    ) -> Option<AnyRef> {
        self.add_arc_with_key(Arc::new(object), key)
    }

    pub fn add_arc_with_key<T: Send + Sync + 'static>(
        &self,
        object: Arc<T>,
        key: impl Into<Key>,
    ) -> Option<AnyRef> {
        let key = key.into();
        let object: AnyRef = object;

        let displaced = self.lock_entries().insert(key.clone(), Arc::clone(&object));

        debug!(key = %key, replaced = displaced.is_some(), "object added");
        self.emit_event(&RegistryEvent::Add {
            key: key.clone(),
            replaced: displaced.is_some(),
        });

        self.notify(&key, Some(&object));
        displaced
    }

    /// Constructs `T::default()`, registers it under the default key and returns a handle.
    ///
    /// A displaced occupant loses the registry's reference.
    pub fn add_default<T: Default + Send + Sync + 'static>(&self) -> Arc<T> {
        let object = Arc::new(T::default());
        self.add_arc(Arc::clone(&object));
        object
    }

    /// Returns the object stored under the default key of `T`.
    ///
    /// `None` if nothing is stored there, or if the stored object is not a `T`.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.get_with_key(Key::of::<T>())
    }

    pub fn get_with_key<T: Send + Sync + 'static>(&self, key: impl Into<Key>) -> Option<Arc<T>> {
        self.require_with_key(key).ok()
    }

    /// Like [`Registry::get`], but tells a missing entry apart from a type mismatch.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] when the key is absent
    /// - [`RegistryError::TypeMismatch`] when the stored object is not a `T`
    pub fn require<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, RegistryError> {
        self.require_with_key(Key::of::<T>())
    }

    pub fn require_with_key<T: Send + Sync + 'static>(
        &self,
        key: impl Into<Key>,
    ) -> Result<Arc<T>, RegistryError> {
        let key = key.into();
        let stored = self.lock_entries().get(&key).cloned();

        let result = match stored {
            Some(object) => object
                .downcast::<T>()
                .map_err(|_| RegistryError::TypeMismatch {
                    key: key.clone(),
                    expected: type_name::<T>(),
                }),
            None => Err(RegistryError::NotFound { key: key.clone() }),
        };

        trace!(key = %key, found = result.is_ok(), "object requested");
        self.emit_event(&RegistryEvent::Get {
            key,
            found: result.is_ok(),
        });

        result
    }

    /// Untyped lookup.
    pub fn get_any(&self, key: impl Into<Key>) -> Option<AnyRef> {
        let key = key.into();
        let stored = self.lock_entries().get(&key).cloned();
        self.emit_event(&RegistryEvent::Get {
            key,
            found: stored.is_some(),
        });
        stored
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.contains_key(Key::of::<T>())
    }

    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        let key = key.into();
        let found = self.lock_entries().contains_key(&key);
        self.emit_event(&RegistryEvent::Contains { key, found });
        found
    }

    /// Removes the object stored under the default key of `T` and releases the registry's
    /// reference to it.
    ///
    /// Subscribers of the key receive `None` before the entry is detached. Returns `false`,
    /// without notifying anyone, if the key is absent or already being removed further up the
    /// call stack.
    ///
    /// If a subscriber stores a new object under the key while being notified, the new object
    /// stays in place.
    pub fn remove<T: ?Sized + 'static>(&self) -> bool {
        self.remove_key(Key::of::<T>())
    }

    pub fn remove_key(&self, key: impl Into<Key>) -> bool {
        self.detach(key.into(), true, |_| true).is_some()
    }

    /// Removes the object stored under the default key of `T` and hands its owning reference to
    /// the caller.
    ///
    /// Subscribers are notified as for [`Registry::remove`]. If the stored object is not a `T`,
    /// nothing is removed and `None` is returned.
    pub fn take<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.take_with_key(Key::of::<T>())
    }

    pub fn take_with_key<T: Send + Sync + 'static>(&self, key: impl Into<Key>) -> Option<Arc<T>> {
        self.detach(key.into(), false, |object| (**object).is::<T>())
            .and_then(|object| object.downcast::<T>().ok())
    }

    /// Untyped variant of [`Registry::take`].
    pub fn take_key(&self, key: impl Into<Key>) -> Option<AnyRef> {
        self.detach(key.into(), false, |_| true)
    }

    /// Notifies subscribers, then drops the entry if it still holds the object seen on entry.
    ///
    /// Returns that object even when a subscriber replaced or removed it during notification.
    fn detach(
        &self,
        key: Key,
        release: bool,
        accept: impl FnOnce(&AnyRef) -> bool,
    ) -> Option<AnyRef> {
        let stored = {
            let entries = self.lock_entries();
            let mut removing = self.lock_removing();
            let object = entries.get(&key)?;
            if removing.contains(&key) || !accept(object) {
                return None;
            }
            removing.insert(key.clone());
            Arc::clone(object)
        };

        self.notify(&key, None);

        let detached = {
            let mut entries = self.lock_entries();
            self.lock_removing().remove(&key);
            let unchanged = entries
                .get(&key)
                .is_some_and(|current| Arc::ptr_eq(current, &stored));
            if unchanged {
                entries.remove(&key)
            } else {
                None
            }
        };

        if detached.is_some() {
            debug!(key = %key, released = release, "object removed");
            self.emit_event(&RegistryEvent::Remove {
                key,
                released: release,
            });
        } else {
            debug!(key = %key, "entry changed while subscribers were notified");
        }
        Some(stored)
    }

    /// All keys that currently have an entry, in no particular order.
    pub fn keys(&self) -> Vec<Key> {
        self.lock_entries().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    /// Drops every entry, factory and subscription without notifying anyone.
    ///
    /// Handles already given out stay valid. The trace callback is kept.
    pub fn clear(&self) {
        self.emit_event(&RegistryEvent::Clear {});

        let entries = std::mem::take(&mut *self.lock_entries());
        let creators = std::mem::take(&mut *self.lock_creators());
        self.subscriptions.clear();

        debug!(
            entries = entries.len(),
            creators = creators.len(),
            "registry cleared"
        );
        drop(entries);
        drop(creators);
    }

    // ---------------------------------------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------------------------------------

    /// Registers a zero-argument factory for `T`, replacing any earlier one.
    pub fn register_creator<T, F>(&self, factory: F)
    where
        T: 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register_creator_with::<T, (), _>(move |()| factory());
    }

    /// Registers a factory for `T` that receives the resolved dependency tuple of `D`.
    ///
    /// ```
    /// use dependency_pool::Registry;
    /// use std::sync::Arc;
    ///
    /// struct Port(u16);
    /// struct Server { port: Option<Arc<Port>> }
    ///
    /// let registry = Registry::new();
    /// registry.register_creator_with::<Server, (Port,), _>(|(port,)| Server { port });
    /// registry.add(Port(8080));
    ///
    /// let server = registry.create::<Server, (Port,)>().unwrap();
    /// assert_eq!(server.port.unwrap().0, 8080);
    /// ```
    pub fn register_creator_with<T, D, F>(&self, factory: F)
    where
        T: 'static,
        D: Dependencies,
        F: Fn(D::Resolved) -> T + Send + Sync + 'static,
    {
        let key = Key::of::<T>();
        let creator: AnyRef = Arc::new(Creator::<T, D>(Box::new(factory)));

        debug!(key = %key, dependencies = type_name::<D>(), "factory registered");
        let previous = self.lock_creators().insert(key, creator);
        drop(previous);
    }

    /// Registers `T::default` as the factory for `T`.
    pub fn register_default_creator<T: Default + 'static>(&self) {
        self.register_creator(T::default);
    }

    pub fn has_creator<T: ?Sized + 'static>(&self) -> bool {
        self.lock_creators().contains_key(&Key::of::<T>())
    }

    pub fn remove_creator<T: ?Sized + 'static>(&self) -> bool {
        let removed = self.lock_creators().remove(&Key::of::<T>());
        removed.is_some()
    }

    /// Builds a new `T` with its registered factory.
    ///
    /// Every type in `D` is resolved with [`Registry::get`] first; unregistered dependencies are
    /// passed as `None`. The new object is returned to the caller and is not registered.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::MissingFactory`] when no factory is registered for `T`
    /// - [`RegistryError::FactorySignature`] when the factory was registered with a dependency
    ///   list other than `D`
    pub fn create<T: 'static, D: Dependencies>(&self) -> Result<T, RegistryError> {
        let key = Key::of::<T>();
        let creator = self
            .lock_creators()
            .get(&key)
            .cloned()
            .ok_or_else(|| RegistryError::MissingFactory { key: key.clone() })?;

        let creator = creator.downcast::<Creator<T, D>>().map_err(|_| {
            RegistryError::FactorySignature {
                key: key.clone(),
                dependencies: type_name::<D>(),
            }
        })?;

        let dependencies = D::resolve(self);

        debug!(key = %key, "creating object");
        self.emit_event(&RegistryEvent::Create { key });

        Ok((creator.0)(dependencies))
    }

    // ---------------------------------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------------------------------

    /// Calls `slot` on `subscriber` whenever an object is added under, or removed from, the
    /// default key of `T`. Removal delivers `None`.
    ///
    /// The subscription holds only a weak reference and ends when `subscriber` is dropped.
    pub fn register_object_notify<T, S>(
        &self,
        subscriber: &Arc<S>,
        slot: fn(&S, Option<Arc<T>>),
    ) -> SubscriptionId
    where
        T: Send + Sync + 'static,
        S: Send + Sync + 'static,
    {
        self.insert_listener(
            Key::of::<T>(),
            Arc::new(ObjectSlot {
                subscriber: Arc::downgrade(subscriber),
                slot,
            }),
        )
    }

    /// Calls `slot` on `subscriber` on every add or remove under the default key of `T`.
    pub fn register_notify<T, S>(&self, subscriber: &Arc<S>, slot: fn(&S)) -> SubscriptionId
    where
        T: ?Sized + 'static,
        S: Send + Sync + 'static,
    {
        self.insert_listener(
            Key::of::<T>(),
            Arc::new(SignalSlot {
                subscriber: Arc::downgrade(subscriber),
                slot,
            }),
        )
    }

    /// Like [`Registry::register_object_notify`] with a free-standing callback whose lifetime is
    /// still tied to `subscriber`.
    pub fn register_notify_fn<T, S, F>(&self, subscriber: &Arc<S>, callback: F) -> SubscriptionId
    where
        T: Send + Sync + 'static,
        S: Send + Sync + 'static,
        F: Fn(Option<Arc<T>>) + Send + Sync + 'static,
    {
        self.insert_listener(
            Key::of::<T>(),
            Arc::new(SubscriberFn {
                subscriber: Arc::downgrade(subscriber),
                callback: Box::new(callback),
            }),
        )
    }

    /// Subscribes `callback` to the default key of `T` for as long as the returned guard lives.
    pub fn subscribe<T, F>(&self, callback: F) -> Subscription
    where
        T: Send + Sync + 'static,
        F: Fn(Option<Arc<T>>) + Send + Sync + 'static,
    {
        self.subscribe_key(Key::of::<T>(), callback)
    }

    pub fn subscribe_key<T, F>(&self, key: impl Into<Key>, callback: F) -> Subscription
    where
        T: Send + Sync + 'static,
        F: Fn(Option<Arc<T>>) + Send + Sync + 'static,
    {
        let id = self.insert_listener(
            key.into(),
            Arc::new(GuardedFn {
                callback: Box::new(callback),
            }),
        );
        Subscription::new(id, &self.subscriptions)
    }

    /// Ends a subscription early. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(id)
    }

    /// Number of live subscriptions for `key`.
    pub fn subscriber_count(&self, key: impl Into<Key>) -> usize {
        self.subscriptions.count(&key.into())
    }

    fn insert_listener(&self, key: Key, listener: Arc<dyn Listener>) -> SubscriptionId {
        trace!(key = %key, "subscription added");
        self.subscriptions.insert(key, listener)
    }

    fn notify(&self, key: &Key, payload: Option<&AnyRef>) {
        let listeners = self.subscriptions.active(key);
        if listeners.is_empty() {
            return;
        }

        let delivered = listeners
            .iter()
            .filter(|listener| listener.deliver(payload))
            .count();

        trace!(key = %key, delivered, "subscribers notified");
        self.emit_event(&RegistryEvent::Notify {
            key: key.clone(),
            delivered,
        });
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.lock_entries().len())
            .field("creators", &self.lock_creators().len())
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn recorder(registry: &Registry) -> Arc<StdMutex<Vec<String>>> {
        let events = Arc::new(StdMutex::new(Vec::new()));
        let events_clone = events.clone();
        registry.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(e.to_string());
        });
        events
    }

    #[test]
    fn test_add_and_get_primitive() {
        let registry = Registry::new();
        assert!(registry.add(42i32).is_none());

        let num: Arc<i32> = registry.get().unwrap();
        assert_eq!(*num, 42);
        assert!(registry.contains::<i32>());
    }

    #[test]
    fn test_get_nonexistent() {
        let registry = Registry::new();
        assert!(registry.get::<String>().is_none());
        assert_eq!(
            registry.require::<String>().unwrap_err(),
            RegistryError::NotFound {
                key: Key::of::<String>()
            }
        );
    }

    #[test]
    fn test_type_mismatch_is_not_found_for_get() {
        let registry = Registry::new();
        registry.add_with_key(1u8, "value");

        assert!(registry.get_with_key::<String>("value").is_none());
        assert_eq!(
            registry.require_with_key::<String>("value").unwrap_err(),
            RegistryError::TypeMismatch {
                key: Key::new("value"),
                expected: "alloc::string::String"
            }
        );
    }

    #[test]
    fn test_overwrite_returns_displaced() {
        let registry = Registry::new();
        registry.add(10i32);
        let displaced = registry.add(20i32).unwrap();

        assert_eq!(*displaced.downcast::<i32>().unwrap(), 10);
        assert_eq!(*registry.get::<i32>().unwrap(), 20);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_arc_shares_object() {
        let registry = Registry::new();
        let value = Arc::new(42i32);
        registry.add_arc(value.clone());

        let retrieved: Arc<i32> = registry.get().unwrap();
        assert!(Arc::ptr_eq(&value, &retrieved));
        assert_eq!(Arc::strong_count(&value), 3); // value + registry + retrieved
    }

    #[test]
    fn test_remove_releases_reference() {
        let registry = Registry::new();
        let value = Arc::new("held".to_string());
        registry.add_arc(value.clone());
        assert_eq!(Arc::strong_count(&value), 2);

        assert!(registry.remove::<String>());
        assert_eq!(Arc::strong_count(&value), 1);
        assert!(!registry.remove::<String>());
        assert!(!registry.contains::<String>());
    }

    #[test]
    fn test_take_hands_ownership_back() {
        let registry = Registry::new();
        registry.add(7u64);

        let taken = registry.take::<u64>().unwrap();
        assert_eq!(Arc::strong_count(&taken), 1);
        assert_eq!(*taken, 7);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_take_mismatch_leaves_entry() {
        let registry = Registry::new();
        registry.add_with_key(3u8, "slot");

        assert!(registry.take_with_key::<u16>("slot").is_none());
        assert!(registry.contains_key("slot"));
        assert!(registry.take_key("slot").is_some());
        assert!(registry.take_key("slot").is_none());
    }

    #[test]
    fn test_add_default() {
        #[derive(Default)]
        struct Settings {
            retries: u32,
        }

        let registry = Registry::new();
        let added = registry.add_default::<Settings>();
        let fetched = registry.get::<Settings>().unwrap();
        assert!(Arc::ptr_eq(&added, &fetched));
        assert_eq!(fetched.retries, 0);
    }

    #[test]
    fn test_keys_and_clear() {
        let registry = Registry::new();
        registry.add(1u8);
        registry.add_with_key(2u8, "second");
        registry.register_creator(|| 0u32);

        let mut keys = registry.keys();
        keys.sort();
        assert_eq!(keys, vec![Key::new("second"), Key::of::<u8>()]);

        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.has_creator::<u32>());
    }

    #[test]
    fn test_trace_events_in_order() {
        let registry = Registry::new();
        let events = recorder(&registry);

        registry.add(5u8);
        let _ = registry.get::<u8>();
        let _ = registry.contains::<u16>();
        registry.remove::<u8>();

        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                "add { key: u8, replaced: false }",
                "get { key: u8, found: true }",
                "contains { key: u16, found: false }",
                "remove { key: u8, released: true }",
            ]
        );
    }

    #[test]
    fn test_trace_notify_event_only_with_subscribers() {
        let registry = Registry::new();
        let events = recorder(&registry);

        let _guard = registry.subscribe::<u8, _>(|_| {});
        registry.add(1u8);
        registry.add(1u16);

        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                "add { key: u8, replaced: false }",
                "notify { key: u8, delivered: 1 }",
                "add { key: u16, replaced: false }",
            ]
        );
    }

    #[test]
    fn test_clear_trace_callback_stops_events() {
        let registry = Registry::new();
        let events = recorder(&registry);

        registry.add(10u16);
        registry.clear_trace_callback();
        registry.add(20u16);
        let _ = registry.get::<u16>();

        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_trace_callback_may_reenter() {
        let registry = Arc::new(Registry::new());
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let (weak, seen_clone) = (Arc::downgrade(&registry), seen.clone());

        registry.set_trace_callback(move |e| {
            if let (RegistryEvent::Add { .. }, Some(registry)) = (e, weak.upgrade()) {
                seen_clone.lock().unwrap().push(registry.len());
            }
        });
        registry.add(1i8);

        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_debug_format() {
        let registry = Registry::new();
        registry.add(1u8);
        let text = format!("{:?}", registry);
        assert!(text.starts_with("Registry"));
        assert!(text.contains("entries: 1"));
    }
}

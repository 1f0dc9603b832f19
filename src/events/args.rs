//! # Per-occurrence event arguments.
//!
//! [`ActionEventArgs`] is created once per firing of an [`ActionEvent`](crate::ActionEvent)
//! and handed by reference to every subscriber of that occurrence. It carries:
//! - the immutable payload ([`ActionEventArgs::data`]);
//! - a [`SharedData`] bag that tasks use to pass values downstream;
//! - a [`CancellationToken`] observed at every suspension point (retry sleeps, chain steps).
//!
//! Cloning is cheap (three `Arc`-backed handles) and yields a view of the **same**
//! occurrence: shared data written through one clone is visible through all others.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

/// Marker for payload types carried by actions.
///
/// Payloads are shared across tasks and threads and are logged by the logging
/// decorator, hence the `Debug + Send + Sync` bound. Implemented for every such type.
pub trait ActionData: fmt::Debug + Send + Sync + 'static {}

impl<T> ActionData for T where T: fmt::Debug + Send + Sync + 'static {}

/// Mutable key/value bag shared by every task of one occurrence.
///
/// Values are type-erased; read them back with [`SharedData::get`] using the type
/// they were stored with.
///
/// ## Example
/// ```rust
/// use actionvisor::SharedData;
///
/// let shared = SharedData::default();
/// shared.insert("user_id", 42_u64);
/// assert_eq!(shared.get::<u64>("user_id").as_deref(), Some(&42));
/// assert!(shared.get::<String>("user_id").is_none());
/// ```
#[derive(Clone, Default)]
pub struct SharedData {
    entries: Arc<DashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl SharedData {
    /// Stores `value` under `key`, returning `true` if a previous value was replaced.
    pub fn insert<V>(&self, key: impl Into<String>, value: V) -> bool
    where
        V: Any + Send + Sync,
    {
        self.entries.insert(key.into(), Arc::new(value)).is_some()
    }

    /// Returns the value under `key` if it exists and has type `V`.
    pub fn get<V>(&self, key: &str) -> Option<Arc<V>>
    where
        V: Any + Send + Sync,
    {
        let value = Arc::clone(self.entries.get(key)?.value());
        value.downcast::<V>().ok()
    }

    /// Returns `true` if a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes the value under `key`, returning `true` if one existed.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for SharedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedData")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Arguments of one action occurrence.
///
/// ## Example
/// ```rust
/// use actionvisor::ActionEventArgs;
///
/// let args = ActionEventArgs::new("payload".to_string());
/// args.shared().insert("seen", true);
///
/// let view = args.clone();
/// assert_eq!(view.data(), "payload");
/// assert!(view.shared().contains("seen"));
/// ```
pub struct ActionEventArgs<T> {
    data: Arc<T>,
    shared: SharedData,
    token: CancellationToken,
}

impl<T> ActionEventArgs<T> {
    /// Creates arguments for a new occurrence with an empty shared bag.
    pub fn new(data: T) -> Self {
        Self::with_token(data, CancellationToken::new())
    }

    /// Creates arguments bound to an external cancellation token.
    pub fn with_token(data: T, token: CancellationToken) -> Self {
        Self {
            data: Arc::new(data),
            shared: SharedData::default(),
            token,
        }
    }

    /// The immutable payload.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// The key/value bag shared by every task of this occurrence.
    pub fn shared(&self) -> &SharedData {
        &self.shared
    }

    /// Cancellation token of this occurrence.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Shorthand for `self.token().is_cancelled()`.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<T> Clone for ActionEventArgs<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            shared: self.shared.clone(),
            token: self.token.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ActionEventArgs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionEventArgs")
            .field("data", &self.data)
            .field("shared", &self.shared)
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

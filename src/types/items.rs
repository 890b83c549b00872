//! String-keyed bag of opaque values carried by clients, requests and responses.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Opaque item value. Values are immutable once inserted and shared between copies.
pub type ItemValue = Arc<dyn Any + Send + Sync>;

/// Context items passed through the middleware pipeline and into request handlers.
///
/// Cloning copies the map: inserting into a clone never shows up in the original.
/// The values themselves are shared.
///
/// # Examples
///
/// ```
/// use fluently_http::Items;
///
/// let mut items = Items::new();
/// items.insert("context", "user");
///
/// let mut copy = items.clone();
/// copy.insert("context", "reward");
///
/// assert_eq!(items.get::<&str>("context"), Some(&"user"));
/// assert_eq!(copy.get::<&str>("context"), Some(&"reward"));
/// ```
#[derive(Clone, Default)]
pub struct Items {
    entries: BTreeMap<String, ItemValue>,
}

impl Items {
    /// Create an empty item bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite a single key.
    pub fn insert<V>(&mut self, key: impl Into<String>, value: V)
    where
        V: Any + Send + Sync,
    {
        self.entries.insert(key.into(), Arc::new(value));
    }

    /// Set or overwrite a key with an already shared value.
    pub fn insert_shared(&mut self, key: impl Into<String>, value: ItemValue) {
        self.entries.insert(key.into(), value);
    }

    /// Typed lookup. Returns `None` when the key is missing or holds another type.
    pub fn get<V: Any>(&self, key: &str) -> Option<&V> {
        self.entries.get(key).and_then(|value| value.downcast_ref::<V>())
    }

    /// Untyped lookup of the shared value.
    pub fn get_shared(&self, key: &str) -> Option<&ItemValue> {
        self.entries.get(key)
    }

    /// Whether an item is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove and return the item stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<ItemValue> {
        self.entries.remove(key)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag holds no items.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Copy every entry of `other` into `self`, overwriting per key.
    pub fn merge(&mut self, other: &Items) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), Arc::clone(value));
        }
    }

    /// Copy the entries of `other` whose keys are not present yet.
    pub fn merge_missing(&mut self, other: &Items) {
        for (key, value) in &other.entries {
            self.entries
                .entry(key.clone())
                .or_insert_with(|| Arc::clone(value));
        }
    }

    /// Whether both bags hold the same shared value under `key`.
    pub fn same_value(&self, other: &Items, key: &str) -> bool {
        match (self.entries.get(key), other.entries.get(key)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Items {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

//! Insertion-ordered mapping used for JSON objects.
//!
//! Ordering follows the usual ordered-dict rules:
//!
//! - inserting a new key appends it
//! - inserting an existing key replaces the value and keeps the key's position
//! - removing a key keeps the relative order of the rest, so re-inserting it
//!   appends it at the end
//!
//! Backed by [`indexmap::IndexMap`]: an entry vector addressed through a hash
//! index. Removal is `shift_remove`, which preserves order at O(n) cost.

use crate::text::Text;
use crate::value::Value;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::ops::Index;

type Inner = IndexMap<Text, Value, ahash::RandomState>;

/// An ordered mapping from [`Text`] keys to [`Value`]s with unique keys.
#[derive(Clone, Default, PartialEq)]
pub struct Map {
    inner: Inner,
}

impl Map {
    pub fn new() -> Self {
        Map::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Map {
            inner: IndexMap::with_capacity_and_hasher(capacity, ahash::RandomState::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Insert `value` under `key`, returning the previous value if the key was
    /// present. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<Text>, value: Value) -> Option<Value> {
        self.inner.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.inner.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Remove `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.inner.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn iter(&self) -> Iter<'_> {
        self.inner.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_> {
        self.inner.iter_mut()
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &Text> + '_ {
        self.inner.keys()
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &Value> + '_ {
        self.inner.values()
    }

    /// The first entry in iteration order.
    pub fn first(&self) -> Option<(&Text, &Value)> {
        self.inner.first()
    }

    /// The last entry in iteration order.
    pub fn last(&self) -> Option<(&Text, &Value)> {
        self.inner.last()
    }

    /// Empty the map, yielding its values in order and dropping the keys.
    pub(crate) fn drain_values(&mut self) -> impl Iterator<Item = Value> + '_ {
        self.inner.drain(..).map(|(_, value)| value)
    }
}

pub type Iter<'a> = indexmap::map::Iter<'a, Text, Value>;
pub type IterMut<'a> = indexmap::map::IterMut<'a, Text, Value>;

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a Text, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl IntoIterator for Map {
    type Item = (Text, Value);
    type IntoIter = indexmap::map::IntoIter<Text, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<K: Into<Text>> FromIterator<(K, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = Map::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<Text>> Extend<(K, Value)> for Map {
    fn extend<I: IntoIterator<Item = (K, Value)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl Index<&str> for Map {
    type Output = Value;

    /// Panics if the key is absent.
    fn index(&self, key: &str) -> &Value {
        match self.inner.get(key) {
            Some(value) => value,
            None => panic!("key {key:?} not present in map"),
        }
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.inner.iter()).finish()
    }
}

impl Serialize for Map {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.inner.len()))?;
        for (key, value) in &self.inner {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use crate::error::{ChartError, ChartResult};

static NEXT_KEY_ID: AtomicU64 = AtomicU64::new(1);

/// Typed token used to store and retrieve values in an [`ExtraStore`].
///
/// Every constructed key is distinct, even for the same `T`. Features keep
/// their own key instance (typically in a `LazyLock` static) so unrelated
/// extras never collide.
pub struct ExtraKey<T> {
    id: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ExtraKey<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_KEY_ID.fetch_add(1, Ordering::Relaxed),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T> Default for ExtraKey<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ExtraKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ExtraKey<T> {}

impl<T> PartialEq for ExtraKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for ExtraKey<T> {}

impl<T> Hash for ExtraKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for ExtraKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtraKey")
            .field("id", &self.id)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

/// Object-safe view of a stored extra value.
///
/// Implemented for every `PartialEq + Debug + Send + Sync + 'static` type so
/// two stores can be compared value by value.
pub trait ExtraValue: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn eq_value(&self, other: &dyn ExtraValue) -> bool;
}

impl<T> ExtraValue for T
where
    T: Any + Send + Sync + fmt::Debug + PartialEq,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_value(&self, other: &dyn ExtraValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }
}

type Entries = IndexMap<u64, Arc<dyn ExtraValue>>;

fn entries_eq(left: &Entries, right: &Entries) -> bool {
    left.len() == right.len()
        && left.iter().all(|(id, value)| {
            right
                .get(id)
                .is_some_and(|other| value.as_ref().eq_value(other.as_ref()))
        })
}

fn typed<'a, T: 'static>(entries: &'a Entries, key: &ExtraKey<T>) -> Option<&'a T> {
    entries
        .get(&key.id)
        .and_then(|value| value.as_ref().as_any().downcast_ref::<T>())
}

/// Immutable typed heterogeneous map attached to models.
///
/// Cloning is cheap; the entries are shared.
#[derive(Clone, Default)]
pub struct ExtraStore {
    entries: Arc<Entries>,
}

impl ExtraStore {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get<T: 'static>(&self, key: &ExtraKey<T>) -> Option<&T> {
        typed(&self.entries, key)
    }

    /// Like [`ExtraStore::get`] but reports a missing value as an error.
    pub fn require<T: 'static>(&self, key: &ExtraKey<T>) -> ChartResult<&T> {
        self.get(key)
            .ok_or(ChartError::MissingExtra { key: key.id })
    }

    #[must_use]
    pub fn contains<T>(&self, key: &ExtraKey<T>) -> bool {
        self.entries.contains_key(&key.id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a store holding both sets of entries; `other` wins on conflicts.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut entries = (*self.entries).clone();
        entries.extend(
            other
                .entries
                .iter()
                .map(|(id, value)| (*id, Arc::clone(value))),
        );
        Self {
            entries: Arc::new(entries),
        }
    }

    #[must_use]
    pub fn to_mutable(&self) -> MutableExtraStore {
        MutableExtraStore {
            entries: (*self.entries).clone(),
        }
    }
}

impl PartialEq for ExtraStore {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries) || entries_eq(&self.entries, &other.entries)
    }
}

impl fmt::Debug for ExtraStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Builder side of [`ExtraStore`], used inside transactions and by hosts.
#[derive(Clone, Default)]
pub struct MutableExtraStore {
    entries: Entries,
}

impl MutableExtraStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T>(&mut self, key: &ExtraKey<T>, value: T)
    where
        T: Any + Send + Sync + fmt::Debug + PartialEq,
    {
        self.entries.insert(key.id, Arc::new(value));
    }

    #[must_use]
    pub fn get<T: 'static>(&self, key: &ExtraKey<T>) -> Option<&T> {
        typed(&self.entries, key)
    }

    #[must_use]
    pub fn contains<T>(&self, key: &ExtraKey<T>) -> bool {
        self.entries.contains_key(&key.id)
    }

    /// Removes the value for `key`; returns whether one was present.
    pub fn remove<T>(&mut self, key: &ExtraKey<T>) -> bool {
        self.entries.shift_remove(&key.id).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freezes the current entries into an immutable store.
    #[must_use]
    pub fn snapshot(&self) -> ExtraStore {
        ExtraStore {
            entries: Arc::new(self.entries.clone()),
        }
    }
}

impl PartialEq for MutableExtraStore {
    fn eq(&self, other: &Self) -> bool {
        entries_eq(&self.entries, &other.entries)
    }
}

impl fmt::Debug for MutableExtraStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ExtraKey, MutableExtraStore};

    #[test]
    fn keys_of_the_same_type_do_not_collide() {
        let first = ExtraKey::<u32>::new();
        let second = ExtraKey::<u32>::new();
        let mut store = MutableExtraStore::new();
        store.set(&first, 1);
        store.set(&second, 2);

        assert_eq!(store.get(&first), Some(&1));
        assert_eq!(store.get(&second), Some(&2));
        assert_ne!(first, second);
    }

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let key = ExtraKey::<String>::new();
        let mut store = MutableExtraStore::new();
        store.set(&key, "before".to_owned());
        let snapshot = store.snapshot();
        store.set(&key, "after".to_owned());

        assert_eq!(snapshot.get(&key).map(String::as_str), Some("before"));
        assert_eq!(store.get(&key).map(String::as_str), Some("after"));
    }
}

//! Hash tables whose entries can die

use std::collections::hash_map::{self, HashMap};
use std::hash::Hash;

/// Smallest table size at which dead entries are swept
const MIN_PRUNE_LEN: usize = 32;

/// An entry that may refer to objects that no longer exist
pub(crate) trait Liveness {
    fn is_live(&self) -> bool;
}

/// A map that sweeps dead entries once it has doubled since the last sweep,
/// keeping the cost of inserts amortized constant.
pub(crate) struct LiveTable<K, V> {
    entries: HashMap<K, V>,
    prune_at: usize,
}

impl<K, V> Default for LiveTable<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            prune_at: MIN_PRUNE_LEN,
        }
    }
}

impl<K: Eq + Hash, V: Liveness> LiveTable<K, V> {
    /// The entry for `key` if it is still live
    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).filter(|entry| entry.is_live())
    }

    /// Insert `value`, returning whether a live entry was replaced
    pub(crate) fn insert(&mut self, key: K, value: V) -> bool {
        if self.entries.len() >= self.prune_at {
            self.prune();
        }
        self.entries
            .insert(key, value)
            .is_some_and(|previous| previous.is_live())
    }

    /// The live entry for `key`, inserting one from `make` if absent or dead
    pub(crate) fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        if self.entries.len() >= self.prune_at {
            self.prune();
        }
        match self.entries.entry(key) {
            hash_map::Entry::Occupied(mut slot) => {
                if !slot.get().is_live() {
                    slot.insert(make());
                }
                slot.into_mut()
            }
            hash_map::Entry::Vacant(slot) => slot.insert(make()),
        }
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    /// Live entries
    pub(crate) fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values().filter(|entry| entry.is_live())
    }

    fn prune(&mut self) {
        self.entries.retain(|_, entry| entry.is_live());
        self.prune_at = (self.entries.len() * 2).max(MIN_PRUNE_LEN);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

//! Maps station names to dense `u32` slots.
//!
//! Slots index straight into the [`AggregateStore`](crate::store::AggregateStore)
//! arrays, so the hot loop hashes a key once per line and never clones it
//! after the first sighting.

use std::hash::{BuildHasher, RandomState};

use hashbrown::HashTable;

pub type Slot = u32;

/// One interner per partition; ids start at 0 and have no gaps.
///
/// Key bytes live once, in `keys`; the hash table only holds slots and
/// compares through that vector.
#[derive(Debug, Default)]
pub struct KeyInterner {
    index: HashTable<Slot>,
    keys: Vec<Box<[u8]>>,
    hasher: RandomState,
}

impl KeyInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `key`, assigning the next id if it is new.
    ///
    /// `key` is only borrowed for the lookup; a new key is copied into an
    /// owned allocation, so the caller may overwrite its buffer right after.
    pub fn alloc(&mut self, key: &[u8]) -> Slot {
        let hash = self.hasher.hash_one(key);
        if let Some(slot) = self.lookup(hash, key) {
            return slot;
        }
        let slot = self.keys.len() as Slot;
        self.keys.push(key.into());

        let Self { index, keys, hasher } = self;
        index.insert_unique(hash, slot, |&s| hasher.hash_one(&*keys[s as usize]));
        slot
    }

    pub fn get(&self, key: &[u8]) -> Option<Slot> {
        self.lookup(self.hasher.hash_one(key), key)
    }

    fn lookup(&self, hash: u64, key: &[u8]) -> Option<Slot> {
        self.index
            .find(hash, |&slot| &*self.keys[slot as usize] == key)
            .copied()
    }

    pub fn resolve(&self, slot: Slot) -> Option<&[u8]> {
        self.keys.get(slot as usize).map(|k| &**k)
    }

    /// Keys with their slots, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &[u8])> + '_ {
        self.keys
            .iter()
            .enumerate()
            .map(|(slot, key)| (slot as Slot, &**key))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

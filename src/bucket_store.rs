//! BucketStore: the bucket array, the entry arena and the length counter.
//!
//! The store works on precomputed hashes only; computing them is the map's
//! job. It owns the treeify trigger and calls into `resize` when a chain
//! outgrows a small table or the load factor is crossed.

use crate::chain_bucket::{self, ChainUpsert};
use crate::entry::{Entry, EntryKey, Slots};
use crate::error::ReserveError;
use crate::hash_index::index_of;
use crate::tree_bucket;
use core::borrow::Borrow;

/// Number of buckets in a freshly created map.
pub const INITIAL_CAPACITY: usize = 16;
/// Ratio of entries to buckets above which the table doubles.
pub const LOAD_FACTOR: f32 = 0.75;
/// Chain length at which a bucket is promoted to a tree.
pub const TREEIFY_THRESHOLD: usize = 8;
/// Smallest table that treeifies; smaller tables grow instead.
pub const MIN_TREEIFY_CAPACITY: usize = 64;

/// Representation of one slot of the bucket array.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) enum Bucket {
    #[default]
    Empty,
    /// Head of a chain.
    Chain(EntryKey),
    /// Root of a red-black tree.
    Tree(EntryKey),
}

impl Bucket {
    pub(crate) fn from_tree_root(root: Option<EntryKey>) -> Self {
        root.map_or(Bucket::Empty, Bucket::Tree)
    }

    pub(crate) fn from_chain_head(head: Option<EntryKey>) -> Self {
        head.map_or(Bucket::Empty, Bucket::Chain)
    }
}

/// Allocate an all-empty bucket array, reporting allocation failure.
pub(crate) fn try_alloc_table(buckets: usize) -> Result<Vec<Bucket>, ReserveError> {
    let mut table = Vec::new();
    table
        .try_reserve_exact(buckets)
        .map_err(|_| ReserveError::AllocFailed { buckets })?;
    table.resize(buckets, Bucket::Empty);
    Ok(table)
}

#[derive(Clone, Debug)]
pub(crate) struct BucketStore<K, V> {
    pub(crate) buckets: Vec<Bucket>,
    pub(crate) slots: Slots<K, V>,
    len: usize,
}

impl<K, V> BucketStore<K, V> {
    /// `capacity` must be a power of two.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            buckets: vec![Bucket::Empty; capacity],
            slots: Slots::with_key(),
            len: 0,
        }
    }

    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, ReserveError> {
        debug_assert!(capacity.is_power_of_two());
        Ok(Self {
            buckets: try_alloc_table(capacity)?,
            slots: Slots::with_key(),
            len: 0,
        })
    }

    pub(crate) fn len(&self) -> usize {
        debug_assert_eq!(self.len, self.slots.len());
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Largest length that does not trigger a resize.
    pub(crate) fn threshold(&self) -> usize {
        (self.capacity() as f32 * LOAD_FACTOR) as usize
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.buckets.fill(Bucket::Empty);
        self.len = 0;
    }

    pub(crate) fn entry(&self, k: EntryKey) -> &Entry<K, V> {
        &self.slots[k]
    }

    pub(crate) fn entry_mut(&mut self, k: EntryKey) -> &mut Entry<K, V> {
        &mut self.slots[k]
    }

    pub(crate) fn find<Q>(&self, hash: u32, key: Option<&Q>) -> Option<EntryKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.buckets[index_of(hash, self.capacity())] {
            Bucket::Empty => None,
            Bucket::Chain(head) => chain_bucket::find(&self.slots, head, hash, key),
            Bucket::Tree(root) => tree_bucket::find(&self.slots, Some(root), key),
        }
    }

    /// Insert or overwrite. Returns the previous value for an existing key.
    pub(crate) fn put(&mut self, hash: u32, key: Option<K>, value: V) -> Option<V>
    where
        K: Ord,
    {
        let index = index_of(hash, self.capacity());
        let bucket = self.buckets[index];
        match bucket {
            Bucket::Empty => {
                let e = self.slots.insert(Entry::new(hash, key, value));
                self.buckets[index] = Bucket::Chain(e);
                self.len += 1;
            }
            Bucket::Chain(head) => match chain_bucket::upsert(&mut self.slots, head, hash, key, value) {
                ChainUpsert::Replaced(prev) => return Some(prev),
                ChainUpsert::Appended { len } => {
                    self.len += 1;
                    if len >= TREEIFY_THRESHOLD {
                        if self.capacity() >= MIN_TREEIFY_CAPACITY {
                            self.treeify(index);
                        } else {
                            self.resize();
                        }
                    }
                }
            },
            Bucket::Tree(root) => {
                let mut root = Some(root);
                let prev = tree_bucket::insert(&mut self.slots, &mut root, hash, key, value);
                self.buckets[index] = Bucket::from_tree_root(root);
                if prev.is_some() {
                    return prev;
                }
                self.len += 1;
            }
        }

        if self.len > self.threshold() {
            self.resize();
        }
        None
    }

    pub(crate) fn remove<Q>(&mut self, hash: u32, key: Option<&Q>) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let index = index_of(hash, self.capacity());
        let bucket = self.buckets[index];
        let removed = match bucket {
            Bucket::Empty => None,
            Bucket::Chain(head) => chain_bucket::delete(&mut self.slots, head, hash, key).map(
                |(new_head, value)| {
                    self.buckets[index] = Bucket::from_chain_head(new_head);
                    value
                },
            ),
            Bucket::Tree(root) => {
                let mut root = Some(root);
                let value = tree_bucket::remove(&mut self.slots, &mut root, key);
                self.buckets[index] = Bucket::from_tree_root(root);
                value
            }
        };
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Link a detached entry into the bucket its stored hash selects.
    /// Used while rehashing; never resizes.
    pub(crate) fn place(&mut self, e: EntryKey)
    where
        K: Ord,
    {
        let index = index_of(self.slots[e].hash, self.capacity());
        let bucket = self.buckets[index];
        match bucket {
            Bucket::Empty => self.buckets[index] = Bucket::Chain(e),
            Bucket::Chain(head) => {
                let len = chain_bucket::append(&mut self.slots, head, e);
                if len >= TREEIFY_THRESHOLD && self.capacity() >= MIN_TREEIFY_CAPACITY {
                    self.treeify(index);
                }
            }
            Bucket::Tree(root) => {
                let mut root = Some(root);
                tree_bucket::attach(&mut self.slots, &mut root, e);
                self.buckets[index] = Bucket::from_tree_root(root);
            }
        }
    }

    /// Promote the chain at `index` to a tree, keeping every entry.
    pub(crate) fn treeify(&mut self, index: usize)
    where
        K: Ord,
    {
        let Bucket::Chain(head) = self.buckets[index] else {
            return;
        };
        let members: Vec<EntryKey> = chain_bucket::walk(&self.slots, head).collect();
        let mut root = None;
        for &e in &members {
            tree_bucket::attach(&mut self.slots, &mut root, e);
        }
        self.buckets[index] = Bucket::from_tree_root(root);
        tracing::trace!(bucket = index, entries = members.len(), "treeified bucket");
    }
}

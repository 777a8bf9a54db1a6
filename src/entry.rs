//! Arena-backed entries shared by chain and tree buckets.
//!
//! Every entry of a map lives in one `SlotMap`; buckets and links refer to
//! entries by `EntryKey`. Parent/child back-references are plain keys, so a
//! tree never owns itself.

use core::borrow::Borrow;
use core::cmp::Ordering;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable generational handle to an entry in the arena.
    pub(crate) struct EntryKey;
}

pub(crate) type Slots<K, V> = SlotMap<EntryKey, Entry<K, V>>;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

#[derive(Clone, Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) hash: u32,
    /// `None` is the absent key.
    pub(crate) key: Option<K>,
    pub(crate) value: V,
    // Chain link; only meaningful while the owning bucket is a chain.
    pub(crate) next: Option<EntryKey>,
    // Tree links; only meaningful while the owning bucket is a tree.
    pub(crate) parent: Option<EntryKey>,
    pub(crate) left: Option<EntryKey>,
    pub(crate) right: Option<EntryKey>,
    pub(crate) color: Color,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(hash: u32, key: Option<K>, value: V) -> Self {
        Self {
            hash,
            key,
            value,
            next: None,
            parent: None,
            left: None,
            right: None,
            color: Color::Red,
        }
    }

    /// Forget every link so the entry can be placed into a fresh bucket.
    pub(crate) fn unlink(&mut self) {
        self.next = None;
        self.parent = None;
        self.left = None;
        self.right = None;
        self.color = Color::Red;
    }

    pub(crate) fn matches<Q>(&self, hash: u32, key: Option<&Q>) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.hash == hash && self.key.as_ref().map(<K as Borrow<Q>>::borrow) == key
    }
}

/// Total order over possibly-absent keys: the absent key sorts before every
/// present key and is equal only to itself.
#[inline]
pub(crate) fn compare_keys<K, Q>(probe: Option<&Q>, stored: Option<&K>) -> Ordering
where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
{
    match (probe, stored) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(p), Some(s)) => p.cmp(s.borrow()),
    }
}

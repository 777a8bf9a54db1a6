//! Iterators over a `ChainTreeMap`.
//!
//! Borrowing iterators follow render order: buckets in array order, chains
//! head to tail, trees left to right.

use crate::bucket_store::Bucket;
use crate::entry::{Entry, EntryKey, Slots};
use crate::tree_bucket::InOrder;
use core::iter::FusedIterator;

enum Cursor {
    Chain(Option<EntryKey>),
    Tree(InOrder),
}

/// Entries of a single bucket.
pub(crate) struct BucketWalk<'a, K, V> {
    slots: &'a Slots<K, V>,
    cursor: Option<Cursor>,
}

impl<'a, K, V> BucketWalk<'a, K, V> {
    pub(crate) fn new(slots: &'a Slots<K, V>, bucket: Bucket) -> Self {
        let cursor = match bucket {
            Bucket::Empty => None,
            Bucket::Chain(head) => Some(Cursor::Chain(Some(head))),
            Bucket::Tree(root) => Some(Cursor::Tree(InOrder::new(slots, root))),
        };
        Self { slots, cursor }
    }
}

impl<'a, K, V> Iterator for BucketWalk<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let k = match self.cursor.as_mut()? {
            Cursor::Chain(cur) => {
                let k = (*cur)?;
                *cur = self.slots[k].next;
                k
            }
            Cursor::Tree(walk) => walk.next(self.slots)?,
        };
        Some(&self.slots[k])
    }
}

/// Entries of every bucket.
pub(crate) struct Walk<'a, K, V> {
    slots: &'a Slots<K, V>,
    buckets: core::slice::Iter<'a, Bucket>,
    current: BucketWalk<'a, K, V>,
}

impl<'a, K, V> Walk<'a, K, V> {
    pub(crate) fn new(slots: &'a Slots<K, V>, buckets: &'a [Bucket]) -> Self {
        Self {
            slots,
            buckets: buckets.iter(),
            current: BucketWalk::new(slots, Bucket::Empty),
        }
    }
}

impl<'a, K, V> Iterator for Walk<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.current.next() {
                return Some(e);
            }
            let &bucket = self.buckets.next()?;
            self.current = BucketWalk::new(self.slots, bucket);
        }
    }
}

/// Iterator over `(key, value)` pairs; `None` is the absent key.
pub struct Iter<'a, K, V> {
    pub(crate) walk: Walk<'a, K, V>,
    pub(crate) remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (Option<&'a K>, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let e = self.walk.next()?;
        self.remaining -= 1;
        Some((e.key.as_ref(), &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over keys in render order.
pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = Option<&'a K>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over values in render order.
pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

/// Mutable iterator over values, in unspecified order.
pub struct ValuesMut<'a, K, V> {
    pub(crate) it: slotmap::basic::ValuesMut<'a, EntryKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| &mut e.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

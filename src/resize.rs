//! ResizeEngine: growing the bucket array and relinking every entry.
//!
//! Entries stay in the arena across a resize; only their links change.
//! Each entry is relinked with its stored hash, so no user `Hash` code runs.
//! The length counter is never touched: a resize neither adds nor drops keys.

use crate::bucket_store::{try_alloc_table, Bucket, BucketStore, INITIAL_CAPACITY};
use crate::chain_bucket;
use crate::entry::EntryKey;
use crate::error::ReserveError;
use crate::tree_bucket;

/// Smallest valid capacity whose load threshold admits `entries`.
pub(crate) fn capacity_for(entries: usize) -> Option<usize> {
    // entries / LOAD_FACTOR rounded up, with LOAD_FACTOR = 3/4.
    let needed = entries.checked_mul(4)?.div_ceil(3);
    needed.max(INITIAL_CAPACITY).checked_next_power_of_two()
}

impl<K: Ord, V> BucketStore<K, V> {
    /// Double the bucket array.
    pub(crate) fn resize(&mut self) {
        let old = self.capacity();
        let new = old * 2;
        self.rehash_into(vec![Bucket::Empty; new]);
        tracing::debug!(
            old_capacity = old,
            new_capacity = new,
            len = self.len(),
            "resized bucket table"
        );
    }

    /// Grow so that `additional` more entries fit without a resize.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), ReserveError> {
        let wanted = self
            .len()
            .checked_add(additional)
            .ok_or(ReserveError::CapacityOverflow)?;
        let buckets = capacity_for(wanted).ok_or(ReserveError::CapacityOverflow)?;
        if buckets <= self.capacity() {
            return Ok(());
        }
        let table = try_alloc_table(buckets)?;
        let old = self.capacity();
        self.rehash_into(table);
        tracing::debug!(
            old_capacity = old,
            new_capacity = buckets,
            len = self.len(),
            "reserved bucket table"
        );
        Ok(())
    }

    fn rehash_into(&mut self, table: Vec<Bucket>) {
        debug_assert!(table.len().is_power_of_two());
        let old = core::mem::replace(&mut self.buckets, table);

        // Chains head to tail; trees node, left subtree, right subtree.
        let mut order: Vec<EntryKey> = Vec::with_capacity(self.len());
        for bucket in old {
            match bucket {
                Bucket::Empty => {}
                Bucket::Chain(head) => order.extend(chain_bucket::walk(&self.slots, head)),
                Bucket::Tree(root) => order.extend(tree_bucket::pre_order(&self.slots, root)),
            }
        }

        for e in order {
            self.slots[e].unlink();
            self.place(e);
        }
    }
}

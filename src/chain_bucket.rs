//! ChainBucket: singly-linked entries scanned linearly.
//!
//! Functions here take a non-empty chain by its head key. They never touch
//! the map's length or capacity; the caller does the bookkeeping.

use crate::entry::{Entry, EntryKey, Slots};
use core::borrow::Borrow;

/// Outcome of `upsert`.
#[derive(Debug)]
pub(crate) enum ChainUpsert<V> {
    /// The key was present; its previous value is returned.
    Replaced(V),
    /// A new entry was appended at the tail; `len` counts it.
    Appended { len: usize },
}

pub(crate) fn find<K, V, Q>(
    slots: &Slots<K, V>,
    head: EntryKey,
    hash: u32,
    key: Option<&Q>,
) -> Option<EntryKey>
where
    K: Borrow<Q>,
    Q: ?Sized + Eq,
{
    let mut cur = Some(head);
    while let Some(k) = cur {
        let e = &slots[k];
        if e.matches(hash, key) {
            return Some(k);
        }
        cur = e.next;
    }
    None
}

pub(crate) fn upsert<K, V>(
    slots: &mut Slots<K, V>,
    head: EntryKey,
    hash: u32,
    key: Option<K>,
    value: V,
) -> ChainUpsert<V>
where
    K: Eq,
{
    let mut cur = head;
    let mut len = 1;
    loop {
        let e = &mut slots[cur];
        if e.matches(hash, key.as_ref()) {
            return ChainUpsert::Replaced(core::mem::replace(&mut e.value, value));
        }
        match e.next {
            Some(n) => {
                cur = n;
                len += 1;
            }
            None => break,
        }
    }
    let appended = slots.insert(Entry::new(hash, key, value));
    slots[cur].next = Some(appended);
    ChainUpsert::Appended { len: len + 1 }
}

/// Link an already-allocated entry at the tail; returns the new length.
pub(crate) fn append<K, V>(slots: &mut Slots<K, V>, head: EntryKey, entry: EntryKey) -> usize {
    let mut cur = head;
    let mut len = 1;
    while let Some(n) = slots[cur].next {
        cur = n;
        len += 1;
    }
    slots[cur].next = Some(entry);
    len + 1
}

/// Unlink and free the first entry matching `key`. Returns the new head
/// (`None` once the chain is empty) and the removed value, or `None` when
/// the key is not in the chain.
pub(crate) fn delete<K, V, Q>(
    slots: &mut Slots<K, V>,
    head: EntryKey,
    hash: u32,
    key: Option<&Q>,
) -> Option<(Option<EntryKey>, V)>
where
    K: Borrow<Q>,
    Q: ?Sized + Eq,
{
    let mut prev: Option<EntryKey> = None;
    let mut cur = Some(head);
    while let Some(k) = cur {
        if slots[k].matches(hash, key) {
            let removed = slots.remove(k)?;
            let new_head = match prev {
                None => removed.next,
                Some(p) => {
                    slots[p].next = removed.next;
                    Some(head)
                }
            };
            return Some((new_head, removed.value));
        }
        prev = Some(k);
        cur = slots[k].next;
    }
    None
}

/// Entries from head to tail.
pub(crate) fn walk<K, V>(slots: &Slots<K, V>, head: EntryKey) -> ChainWalk<'_, K, V> {
    ChainWalk {
        slots,
        cur: Some(head),
    }
}

pub(crate) struct ChainWalk<'a, K, V> {
    slots: &'a Slots<K, V>,
    cur: Option<EntryKey>,
}

impl<'a, K, V> Iterator for ChainWalk<'a, K, V> {
    type Item = EntryKey;

    fn next(&mut self) -> Option<EntryKey> {
        let k = self.cur?;
        self.cur = self.slots[k].next;
        Some(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_of(slots: &mut Slots<u32, &'static str>, keys: &[(u32, &'static str)]) -> EntryKey {
        let (k0, v0) = keys[0];
        let head = slots.insert(Entry::new(0, Some(k0), v0));
        for &(k, v) in &keys[1..] {
            match upsert(slots, head, 0, Some(k), v) {
                ChainUpsert::Appended { .. } => {}
                other => panic!("unexpected result: {:?}", other),
            }
        }
        head
    }

    fn keys_of(slots: &Slots<u32, &'static str>, head: Option<EntryKey>) -> Vec<u32> {
        head.map(|h| walk(slots, h).filter_map(|k| slots[k].key).collect())
            .unwrap_or_default()
    }

    #[test]
    fn upsert_appends_at_tail_and_reports_length() {
        let mut slots = Slots::with_key();
        let head = slots.insert(Entry::new(0, Some(1), "a"));
        match upsert(&mut slots, head, 0, Some(2), "b") {
            ChainUpsert::Appended { len } => assert_eq!(len, 2),
            other => panic!("unexpected result: {:?}", other),
        }
        match upsert(&mut slots, head, 0, Some(3), "c") {
            ChainUpsert::Appended { len } => assert_eq!(len, 3),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(keys_of(&slots, Some(head)), vec![1, 2, 3]);
    }

    #[test]
    fn upsert_replaces_existing_value() {
        let mut slots = Slots::with_key();
        let head = chain_of(&mut slots, &[(1, "a"), (2, "b")]);
        match upsert(&mut slots, head, 0, Some(2), "B") {
            ChainUpsert::Replaced(prev) => assert_eq!(prev, "b"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(slots.len(), 2);
        let found = find::<_, _, u32>(&slots, head, 0, Some(&2)).unwrap();
        assert_eq!(slots[found].value, "B");
    }

    #[test]
    fn find_respects_hash_and_absent_key() {
        let mut slots: Slots<u32, &str> = Slots::with_key();
        let head = slots.insert(Entry::new(0, None, "null"));
        let _ = upsert(&mut slots, head, 5, Some(9), "nine");
        assert!(find::<_, _, u32>(&slots, head, 0, None).is_some());
        assert!(find::<_, _, u32>(&slots, head, 5, Some(&9)).is_some());
        assert!(find::<_, _, u32>(&slots, head, 0, Some(&9)).is_none());
    }

    #[test]
    fn delete_head_middle_and_tail_preserves_order() {
        let mut slots = Slots::with_key();
        let head = chain_of(&mut slots, &[(1, "a"), (2, "b"), (3, "c"), (4, "d")]);

        let (head2, v) = delete::<_, _, u32>(&mut slots, head, 0, Some(&2)).unwrap();
        assert_eq!(v, "b");
        assert_eq!(head2, Some(head));
        assert_eq!(keys_of(&slots, head2), vec![1, 3, 4]);

        let (head3, v) = delete::<_, _, u32>(&mut slots, head, 0, Some(&1)).unwrap();
        assert_eq!(v, "a");
        assert_eq!(keys_of(&slots, head3), vec![3, 4]);

        let h = head3.unwrap();
        let (head4, v) = delete::<_, _, u32>(&mut slots, h, 0, Some(&4)).unwrap();
        assert_eq!(v, "d");
        assert_eq!(keys_of(&slots, head4), vec![3]);

        let (head5, v) = delete::<_, _, u32>(&mut slots, h, 0, Some(&3)).unwrap();
        assert_eq!(v, "c");
        assert!(head5.is_none());
        assert!(slots.is_empty());
    }

    #[test]
    fn delete_missing_key_is_none() {
        let mut slots = Slots::with_key();
        let head = chain_of(&mut slots, &[(1, "a")]);
        assert!(delete::<_, _, u32>(&mut slots, head, 0, Some(&7)).is_none());
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn append_links_existing_entry() {
        let mut slots = Slots::with_key();
        let head = chain_of(&mut slots, &[(1, "a"), (2, "b")]);
        let loose = slots.insert(Entry::new(0, Some(3), "c"));
        assert_eq!(append(&mut slots, head, loose), 3);
        assert_eq!(keys_of(&slots, Some(head)), vec![1, 2, 3]);
    }
}

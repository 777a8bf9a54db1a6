//! ChainTreeMap: the public map façade.
//!
//! Hashes keys, then hands everything else to `BucketStore`. Rendering and
//! the diagnostic dump live here as well.

use crate::bucket_store::{BucketStore, INITIAL_CAPACITY};
use crate::error::ReserveError;
use crate::hash_index::hash_key;
use crate::iter::{BucketWalk, Iter, Keys, Values, ValuesMut, Walk};
use crate::resize::capacity_for;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Hash map whose buckets are chains until they collect
/// [`TREEIFY_THRESHOLD`](crate::TREEIFY_THRESHOLD) entries, then red-black
/// trees ordered by `K: Ord`.
///
/// Besides ordinary keys the map holds at most one entry under the absent
/// key, reached through the `*_absent` methods.
#[derive(Clone)]
pub struct ChainTreeMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    pub(crate) store: BucketStore<K, V>,
}

impl<K, V> ChainTreeMap<K, V> {
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Map able to hold `n` entries before its first resize.
    ///
    /// Panics if the required table size overflows or cannot be allocated.
    pub fn with_capacity(n: usize) -> Self {
        Self::with_capacity_and_hasher(n, DefaultHashBuilder::default())
    }

    pub fn try_with_capacity(n: usize) -> Result<Self, ReserveError> {
        Self::try_with_capacity_and_hasher(n, DefaultHashBuilder::default())
    }
}

impl<K, V> Default for ChainTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainTreeMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            store: BucketStore::with_capacity(INITIAL_CAPACITY),
        }
    }

    pub fn with_capacity_and_hasher(n: usize, hasher: S) -> Self {
        match Self::try_with_capacity_and_hasher(n, hasher) {
            Ok(map) => map,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_with_capacity_and_hasher(n: usize, hasher: S) -> Result<Self, ReserveError> {
        let buckets = capacity_for(n).ok_or(ReserveError::CapacityOverflow)?;
        Ok(Self {
            hasher,
            store: BucketStore::try_with_capacity(buckets)?,
        })
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Number of distinct keys, the absent key included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current number of buckets; always a power of two.
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Drop every entry; the bucket array keeps its size.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            walk: Walk::new(&self.store.slots, &self.store.buckets),
            remaining: self.len(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Mutable access to every value. Unlike [`iter`](Self::iter), the
    /// order is unspecified.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            it: self.store.slots.values_mut(),
        }
    }

    /// Multi-line dump of every non-empty bucket, for diagnostics.
    pub fn debug_info(&self) -> DebugInfo<'_, K, V, S> {
        DebugInfo { map: self }
    }
}

impl<K, V, S> ChainTreeMap<K, V, S>
where
    K: Hash + Ord,
    S: BuildHasher,
{
    /// Insert `value` under `key`, returning the value it replaces.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let hash = hash_key(&self.hasher, Some(&key));
        self.store.put(hash, Some(key), value)
    }

    /// Insert `value` under the absent key.
    pub fn put_absent(&mut self, value: V) -> Option<V> {
        let hash = hash_key::<K, S>(&self.hasher, None);
        self.store.put(hash, None, value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.lookup(Some(key)).map(|v| &v.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let hash = hash_key(&self.hasher, Some(key));
        let e = self.store.find(hash, Some(key))?;
        Some(&mut self.store.entry_mut(e).value)
    }

    pub fn get_absent(&self) -> Option<&V> {
        self.lookup::<K>(None).map(|v| &v.value)
    }

    pub fn get_absent_mut(&mut self) -> Option<&mut V> {
        let hash = hash_key::<K, S>(&self.hasher, None);
        let e = self.store.find::<K>(hash, None)?;
        Some(&mut self.store.entry_mut(e).value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.lookup(Some(key)).is_some()
    }

    pub fn contains_absent(&self) -> bool {
        self.lookup::<K>(None).is_some()
    }

    /// Remove `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let hash = hash_key(&self.hasher, Some(key));
        self.store.remove(hash, Some(key))
    }

    pub fn remove_absent(&mut self) -> Option<V> {
        let hash = hash_key::<K, S>(&self.hasher, None);
        self.store.remove::<K>(hash, None)
    }

    /// Grow ahead of time so that `additional` more keys fit without a resize.
    ///
    /// Panics if the table size overflows or cannot be allocated.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(e) = self.try_reserve(additional) {
            panic!("{e}");
        }
    }

    pub fn try_reserve(&mut self, additional: usize) -> Result<(), ReserveError> {
        self.store.try_reserve(additional)
    }

    fn lookup<Q>(&self, key: Option<&Q>) -> Option<&crate::entry::Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let hash = hash_key(&self.hasher, key);
        self.store.find(hash, key).map(|e| self.store.entry(e))
    }
}

impl<K, V, S> Extend<(K, V)> for ChainTreeMap<K, V, S>
where
    K: Hash + Ord,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainTreeMap<K, V, S>
where
    K: Hash + Ord,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainTreeMap<K, V, S> {
    type Item = (Option<&'a K>, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders a possibly-absent key.
struct ShowKey<'a, K>(Option<&'a K>);

impl<K: fmt::Display> fmt::Display for ShowKey<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(k) => fmt::Display::fmt(k, f),
            None => f.write_str("<absent>"),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for ShowKey<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(k) => fmt::Debug::fmt(k, f),
            None => f.write_str("<absent>"),
        }
    }
}

/// `{k=v, k=v}` in render order.
impl<K: fmt::Display, V: fmt::Display, S> fmt::Display for ChainTreeMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", ShowKey(k), v)?;
        }
        f.write_str("}")
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ChainTreeMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, v)| (ShowKey(k), v)))
            .finish()
    }
}

/// Diagnostic view returned by [`ChainTreeMap::debug_info`].
pub struct DebugInfo<'a, K, V, S> {
    map: &'a ChainTreeMap<K, V, S>,
}

impl<K: fmt::Display, V: fmt::Display, S> fmt::Display for DebugInfo<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::bucket_store::Bucket;

        let store = &self.map.store;
        writeln!(f, "=== chaintree map ===")?;
        writeln!(f, "size: {}", store.len())?;
        writeln!(f, "capacity: {}", store.capacity())?;
        writeln!(
            f,
            "load factor: {}",
            store.len() as f32 / store.capacity() as f32
        )?;
        for (i, &bucket) in store.buckets.iter().enumerate() {
            let (tag, sep) = match bucket {
                Bucket::Empty => continue,
                Bucket::Chain(_) => ("chain", " -> "),
                Bucket::Tree(_) => ("tree", ", "),
            };
            write!(f, "bucket {i} [{tag}]: ")?;
            for (n, e) in BucketWalk::new(&store.slots, bucket).enumerate() {
                if n > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{}={}", ShowKey(e.key.as_ref()), e.value)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "=====================")
    }
}

//! HashIndexer: scrambled 32-bit hashes and bucket indices.

use core::hash::{BuildHasher, Hash};

/// Hash stored for the absent key.
pub(crate) const ABSENT_HASH: u32 = 0;

/// Fold a 64-bit native hash to 32 bits, then spread the upper 16 bits into
/// the lower 16 so that masking with a small capacity still sees them.
#[inline]
pub(crate) fn spread(native: u64) -> u32 {
    let h = (native ^ (native >> 32)) as u32;
    h ^ (h >> 16)
}

/// Hash of a (possibly absent) key under `hasher`.
#[inline]
pub(crate) fn hash_key<Q, S>(hasher: &S, key: Option<&Q>) -> u32
where
    Q: ?Sized + Hash,
    S: BuildHasher,
{
    match key {
        None => ABSENT_HASH,
        Some(k) => spread(hasher.hash_one(k)),
    }
}

/// Bucket index for `hash`. `capacity` must be a power of two.
#[inline]
pub(crate) fn index_of(hash: u32, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    (hash as usize) & (capacity - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::{BuildHasherDefault, Hasher};

    #[derive(Default)]
    struct Identity(u64);
    impl Hasher for Identity {
        fn write(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.0 = (self.0 << 8) | u64::from(b);
            }
        }
        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
        fn finish(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn absent_key_hashes_to_zero() {
        let s = BuildHasherDefault::<Identity>::default();
        assert_eq!(hash_key::<u64, _>(&s, None), 0);
    }

    #[test]
    fn spread_folds_upper_halves() {
        assert_eq!(spread(0), 0);
        assert_eq!(spread(0x1_0000), 0x1_0001);
        assert_eq!(spread(0x0000_0001_0000_0000), 0x0000_0001);
        // Small native hashes are left untouched.
        assert_eq!(spread(0x30), 0x30);
    }

    #[test]
    fn multiples_of_capacity_share_a_bucket() {
        let s = BuildHasherDefault::<Identity>::default();
        for i in 0..10u64 {
            let h = hash_key(&s, Some(&(i * 16)));
            assert_eq!(index_of(h, 16), 0);
        }
    }

    #[test]
    fn index_masks_low_bits() {
        assert_eq!(index_of(0xffff_ffff, 16), 15);
        assert_eq!(index_of(17, 16), 1);
        assert_eq!(index_of(17, 32), 17);
    }
}

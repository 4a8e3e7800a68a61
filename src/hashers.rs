//! Deterministic hashing for integer keys.

use core::hash::{BuildHasher, Hasher};

/// `BuildHasher` whose hashers return integer keys unchanged, so an integer
/// key `k` has home index `k mod capacity`. Useful for reasoning about
/// probe layouts; a poor choice for adversarial or clustered keys.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityBuildHasher;

impl BuildHasher for IdentityBuildHasher {
    type Hasher = IdentityHasher;

    fn build_hasher(&self) -> Self::Hasher {
        IdentityHasher(0)
    }
}

/// Hasher produced by [`IdentityBuildHasher`]. Every write folds into the
/// state as `state * FOLD ^ bits`. A fresh state is zero, so a single
/// integer write is the hash; strings and tuples mix all of their parts.
#[derive(Clone, Debug, Default)]
pub struct IdentityHasher(u64);

const FOLD: u64 = 0x9e37_79b9_7f4a_7c15;

impl IdentityHasher {
    #[inline]
    fn fold(&mut self, n: u64) {
        self.0 = self.0.wrapping_mul(FOLD) ^ n;
    }
}

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.fold(b.into());
        }
    }

    fn write_u8(&mut self, n: u8) {
        self.fold(n.into());
    }
    fn write_u16(&mut self, n: u16) {
        self.fold(n.into());
    }
    fn write_u32(&mut self, n: u32) {
        self.fold(n.into());
    }
    fn write_u64(&mut self, n: u64) {
        self.fold(n);
    }
    fn write_usize(&mut self, n: usize) {
        self.fold(n as u64);
    }
    fn write_i8(&mut self, n: i8) {
        self.write_u8(n as u8);
    }
    fn write_i16(&mut self, n: i16) {
        self.write_u16(n as u16);
    }
    fn write_i32(&mut self, n: i32) {
        self.write_u32(n as u32);
    }
    fn write_i64(&mut self, n: i64) {
        self.write_u64(n as u64);
    }
    fn write_isize(&mut self, n: isize) {
        self.write_usize(n as usize);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_hash_to_themselves() {
        let s = IdentityBuildHasher;
        assert_eq!(s.hash_one(21u32), 21);
        assert_eq!(s.hash_one(7usize), 7);
        assert_eq!(s.hash_one(1_000_000i64), 1_000_000);
    }

    #[test]
    fn byte_writes_fold_in_order() {
        let bytes = |b: &[u8]| {
            let mut h = IdentityBuildHasher.build_hasher();
            h.write(b);
            h.finish()
        };
        assert_eq!(bytes(&[0x2a]), 0x2a);
        assert_eq!(bytes(&[0x01, 0x02]), FOLD ^ 0x02);
        assert_ne!(bytes(&[0x01, 0x02]), bytes(&[0x02, 0x01]));
    }

    #[test]
    fn strings_and_tuples_keep_every_part() {
        let s = IdentityBuildHasher;
        let a = s.hash_one("a");
        let b = s.hash_one("b");
        let hello = s.hash_one("hello");
        assert_ne!(a, b);
        assert_ne!(a, hello);
        assert_ne!(b, hello);
        assert_ne!(s.hash_one((1u32, 2u32)), s.hash_one((7u32, 2u32)));
        assert_ne!(s.hash_one((1u64, 2u64)), s.hash_one((2u64, 1u64)));
    }

    #[test]
    fn string_keys_spread_over_the_table() {
        let s = IdentityBuildHasher;
        let mut homes = std::collections::HashSet::new();
        for i in 0..100 {
            homes.insert(s.hash_one(format!("k{i}")) % 10);
        }
        assert!(homes.len() > 1);
    }
}

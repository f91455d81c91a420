// Copyright (c) 2018 Aleksandr Bezobchuk
// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! A fixed-size Bloom filter over string keys.
//!
//! Filters are built once from a complete key set and are immutable from then
//! on: there is no insertion after construction, no deletion and no merging.

use std::f64;

use crate::bitvec::BitVec;
use crate::error::{positive, Error, Result};
use crate::hash;

/// `ln` squared.
const LN_SQR: f64 = f64::consts::LN_2 * f64::consts::LN_2;

/// A Bloom filter with `q` bits and `k` hash rounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BloomFilter {
    bits: BitVec,
    nhashes: usize,
}

impl BloomFilter {
    /// Build a filter of `q` bits using `k` hash rounds, from a set of keys.
    ///
    /// For every key and every round `i` in `1..=k`, the bit at
    /// [`hash::hash`]`(key, i, q)` is set. An empty key set yields an
    /// all-zero filter.
    pub fn build<I>(k: usize, q: usize, keys: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        positive("k", k)?;
        positive("q", q)?;

        let mut bits = BitVec::new(q);
        for key in keys {
            for round in 1..=k {
                bits.set(hash::hash(key.as_ref(), round, q)?);
            }
        }
        Ok(BloomFilter { bits, nhashes: k })
    }

    /// Return whether or not a given key is likely in the filter. There is a
    /// possibility of a false positive, but a false negative will never occur.
    pub fn may_contain(&self, key: &str) -> bool {
        let q = self.bits.len();

        for round in 1..=self.nhashes {
            // `q` is positive by construction, so hashing can't fail.
            match hash::hash(key, round, q) {
                Ok(index) if self.bits.is_set(index) => continue,
                _ => return false,
            }
        }
        true
    }

    /// Return the number of bits in this filter (`q` parameter).
    pub fn bits(&self) -> usize {
        self.bits.len()
    }

    /// Number of hash rounds used (`k` parameter).
    pub fn hashes(&self) -> usize {
        self.nhashes
    }

    /// Number of bits set to `1`.
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Whether every bit set in this filter is also set in `other`.
    ///
    /// Returns `false` for filters with different `(k, q)`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.nhashes == other.nhashes
            && self.bits.len() == other.bits.len()
            && self.bits.is_subset(&other.bits)
    }

    /// Return the underlying bit array.
    pub fn bitvec(&self) -> &BitVec {
        &self.bits
    }

    /// Return the underlying bytes storage.
    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_bytes()
    }
}

impl AsRef<[u8]> for BloomFilter {
    fn as_ref(&self) -> &[u8] {
        self.bits.as_bytes()
    }
}

/// Query `filter` for `key`, checking that the caller's `(k, q)` matches the
/// parameters the filter was built with.
pub fn may_contain(filter: &BloomFilter, key: &str, k: usize, q: usize) -> Result<bool> {
    if k != filter.hashes() {
        return Err(Error::invalid("k", k));
    }
    if q != filter.bits() {
        return Err(Error::invalid("q", q));
    }
    Ok(filter.may_contain(key))
}

/// Return the optimal bit vector size for a Bloom filter given an approximate
/// size and a desired false positive rate.
pub fn optimal_bits(capacity: usize, fp_rate: f64) -> usize {
    (-((fp_rate.ln() * (capacity as f64)) / LN_SQR)).ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::iter;

    fn key() -> String {
        let rng = fastrand::Rng::new();
        iter::repeat_with(|| rng.alphanumeric()).take(32).collect()
    }

    fn items(size: usize) -> Vec<String> {
        let mut items = HashSet::<String>::new();
        for _ in 0..size {
            items.insert(key());
        }
        items.into_iter().collect()
    }

    #[test]
    fn test_bloom_filter() {
        let n = 512;
        let items = items(n);
        let bf = BloomFilter::build(7, 10 * n, &items).unwrap();

        // Test inclusion.
        for item in items.iter() {
            assert_eq!(
                bf.may_contain(item),
                true,
                "item {} should result in a positive inclusion",
                item,
            );
        }

        // Test false positives stay rare at ten bits per item.
        let positives = (0..n)
            .map(|_| key())
            .filter(|k| !items.contains(k) && bf.may_contain(k))
            .count();
        assert!(positives < n / 10, "{} false positives", positives);
    }

    #[test]
    fn test_build_sets_round_indexes() {
        let bf = BloomFilter::build(3, 1000, ["alice"]).unwrap();

        assert_eq!(bf.bits(), 1000);
        assert_eq!(bf.hashes(), 3);
        assert_eq!(
            bf.bitvec().ones().collect::<Vec<_>>(),
            vec![307, 772, 817]
        );
    }

    #[test]
    fn test_empty_key_set() {
        let bf = BloomFilter::build(4, 64, Vec::<String>::new()).unwrap();

        assert_eq!(bf.count_ones(), 0);
        assert!(!bf.may_contain("anything"));
        assert!(bf.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_single_bit_filter() {
        let bf = BloomFilter::build(5, 1, ["a", "b"]).unwrap();

        assert_eq!(bf.count_ones(), 1);
        assert!(bf.may_contain("zzz"));
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            BloomFilter::build(0, 10, ["a"]),
            Err(Error::InvalidParameter { name: "k", value: 0 })
        );
        assert_eq!(
            BloomFilter::build(1, 0, ["a"]),
            Err(Error::InvalidParameter { name: "q", value: 0 })
        );
    }

    #[test]
    fn test_may_contain_checks_parameters() {
        let bf = BloomFilter::build(2, 100, ["a"]).unwrap();

        assert_eq!(may_contain(&bf, "a", 2, 100), Ok(true));
        assert!(may_contain(&bf, "a", 3, 100).is_err());
        assert!(may_contain(&bf, "a", 2, 101).is_err());
    }

    #[test]
    fn test_is_subset_requires_same_parameters() {
        let a = BloomFilter::build(2, 100, ["a"]).unwrap();
        let b = BloomFilter::build(3, 100, ["a"]).unwrap();

        assert!(a.is_subset(&a));
        assert!(!a.is_subset(&b));
    }

    #[test]
    fn test_optimal_bits() {
        assert_eq!(optimal_bits(10, 0.04), 67);
        assert_eq!(optimal_bits(5000, 0.01), 47926);
        assert_eq!(optimal_bits(100000, 0.01), 958506);
    }

    proptest! {
        #[test]
        fn prop_no_false_negatives(
            keys in proptest::collection::vec("[a-z0-9]{1,12}", 0..40),
            k in 1usize..8,
            q in 1usize..512,
        ) {
            let bf = BloomFilter::build(k, q, &keys).unwrap();

            for key in &keys {
                prop_assert!(bf.may_contain(key));
            }
        }

        #[test]
        fn prop_subset_keys_give_subset_bits(
            keys in proptest::collection::vec("[a-z0-9]{1,12}", 0..40),
            split in 0usize..40,
            k in 1usize..8,
            q in 1usize..512,
        ) {
            let split = split.min(keys.len());
            let small = BloomFilter::build(k, q, &keys[..split]).unwrap();
            let large = BloomFilter::build(k, q, &keys).unwrap();

            prop_assert!(small.is_subset(&large));
        }
    }
}

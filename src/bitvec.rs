// Copyright (c) 2020 Helge Wrede, Alexander Schultheiß, Lukas Simon
// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! Bit vector functionality.
use std::fmt::Debug;

/// A packed, fixed-length bit vector.
#[derive(Clone, PartialEq, Eq)]
pub struct BitVec {
    bytes: Vec<u8>,
    nbits: usize,
}

impl BitVec {
    /// Create a new zeroed bit vector of the given length, in bits.
    pub fn new(nbits: usize) -> Self {
        Self {
            nbits,
            bytes: vec![0; (nbits + 7) / 8],
        }
    }

    /// Get the length in bits of the vector.
    pub fn len(&self) -> usize {
        self.nbits
    }

    /// Check whether this vector is empty, ie. has a length of zero.
    pub fn is_empty(&self) -> bool {
        self.nbits == 0
    }

    /// Set a single bit to `1`.
    pub fn set(&mut self, index: usize) {
        self.check_bounds(index);
        self.bytes[index / 8] |= 1 << (index % 8);
    }

    /// Check whether a bit is set.
    pub fn is_set(&self, index: usize) -> bool {
        self.check_bounds(index);
        let mask = 1 << (index % 8);

        self.bytes[index / 8] & mask == mask
    }

    /// Count the number of `1` bits.
    pub fn count_ones(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Count the number of `0` bits.
    pub fn count_zeros(&self) -> usize {
        self.len() - self.count_ones()
    }

    /// Whether every bit set in `self` is also set in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        if self.nbits != other.nbits {
            panic!(
                "unable to compare bitvecs with different lengths: {} and {}",
                self.nbits, other.nbits
            );
        }
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .all(|(a, b)| a & !b == 0)
    }

    /// Iterate over the indexes of the set bits, in ascending order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.nbits).filter(move |i| self.is_set(*i))
    }

    /// Return the underlying bytes storage.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn check_bounds(&self, index: usize) {
        if index >= self.nbits {
            panic!(
                "index out of bounds: the len is {} but the index is {}",
                self.nbits, index,
            )
        }
    }
}

impl Debug for BitVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits: String = (0..self.nbits)
            .map(|i| if self.is_set(i) { '1' } else { '0' })
            .collect();
        write!(f, "BitVec({})", bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitvec_with_length() {
        let bitvec = BitVec::new(1);
        assert_eq!(1, bitvec.len());
        assert_eq!(1, bitvec.bytes.len());

        let bitvec = BitVec::new(8);
        assert_eq!(8, bitvec.len());
        assert_eq!(1, bitvec.bytes.len());

        let bitvec = BitVec::new(9);
        assert_eq!(9, bitvec.len());
        assert_eq!(2, bitvec.bytes.len());

        let bitvec = BitVec::new(0);
        assert!(bitvec.is_empty());
        assert_eq!(0, bitvec.bytes.len());
    }

    #[test]
    fn set_last_bit_only() {
        let mut bitvec = BitVec::new(9);
        bitvec.set(8);
        for i in 0..8 {
            assert_eq!(false, bitvec.is_set(i));
        }
        assert_eq!(true, bitvec.is_set(8));
        assert_eq!(vec![8], bitvec.ones().collect::<Vec<_>>());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn must_set_with_correct_index() {
        BitVec::new(5).set(5);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn must_get_with_correct_index() {
        BitVec::new(12).is_set(12);
    }

    #[test]
    fn count_ones_and_zeros() {
        let mut bitvec = BitVec::new(24);
        assert_eq!(0, bitvec.count_ones());
        assert_eq!(24, bitvec.count_zeros());

        bitvec.set(0);
        bitvec.set(7);
        bitvec.set(8);
        bitvec.set(23);
        bitvec.set(23);

        assert_eq!(4, bitvec.count_ones());
        assert_eq!(20, bitvec.count_zeros());
        assert_eq!(vec![0, 7, 8, 23], bitvec.ones().collect::<Vec<_>>());
    }

    #[test]
    fn subset() {
        let mut a = BitVec::new(10);
        let mut b = BitVec::new(10);
        assert!(a.is_subset(&b));

        a.set(3);
        assert!(!a.is_subset(&b));

        b.set(3);
        b.set(9);
        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));
    }

    #[test]
    #[should_panic(expected = "different lengths")]
    fn subset_requires_same_length() {
        BitVec::new(4).is_subset(&BitVec::new(5));
    }

    #[test]
    fn debug_format() {
        let mut bitvec = BitVec::new(5);
        bitvec.set(1);
        bitvec.set(4);
        assert_eq!("BitVec(01001)", format!("{:?}", bitvec));
    }
}

// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! The hash family used to place keys in the filter.
//!
//! Each round `i` rewrites the key with one of three [`Transform`]s chosen by
//! `i mod 3`, then reduces the SHA-256 digest of the rewritten key modulo the
//! array length. Varying where the round index lands in the input keeps the
//! `k` indexes of a key from being correlated, which a plain `hash(key) + i`
//! scheme would not.
use sha2::{Digest, Sha256};

use crate::error::{positive, Result};

/// How a key is rewritten before digesting, for a given round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transform {
    /// `key ++ round`, used when `round ≡ 0 (mod 3)`.
    Suffix,
    /// `round ++ key`, used when `round ≡ 1 (mod 3)`.
    Prefix,
    /// `key[..mid] ++ round ++ key[mid..]`, used when `round ≡ 2 (mod 3)`.
    Infix,
}

impl Transform {
    /// Select the transform for a round.
    pub fn for_round(round: usize) -> Self {
        match round % 3 {
            0 => Self::Suffix,
            1 => Self::Prefix,
            _ => Self::Infix,
        }
    }

    /// Rewrite `key` with the decimal representation of `round`.
    ///
    /// The infix split happens after `n / 2` characters, where `n` is the
    /// number of characters in `key`.
    pub fn apply(self, key: &str, round: usize) -> String {
        match self {
            Self::Suffix => format!("{key}{round}"),
            Self::Prefix => format!("{round}{key}"),
            Self::Infix => {
                let half = key.chars().count() / 2;
                let mid = key
                    .char_indices()
                    .nth(half)
                    .map_or(key.len(), |(offset, _)| offset);
                let (head, tail) = key.split_at(mid);

                format!("{head}{round}{tail}")
            }
        }
    }
}

/// Rewrite `key` for `round` with the transform that round selects.
pub fn transform(key: &str, round: usize) -> String {
    Transform::for_round(round).apply(key, round)
}

/// Reduce the SHA-256 digest of `bytes`, read as a big-endian 256-bit
/// unsigned integer, modulo `q`.
pub fn digest_index(bytes: &[u8], q: usize) -> Result<usize> {
    let q = positive("q", q)? as u128;
    let digest = Sha256::digest(bytes);
    // Horner's rule; `r < q <= u64::MAX`, so `r << 8` fits in 128 bits.
    let r = digest
        .iter()
        .fold(0u128, |r, b| ((r << 8) | *b as u128) % q);

    Ok(r as usize)
}

/// Index in `[0, q)` of `key` for the given hash `round`.
///
/// Deterministic: the same `(key, round, q)` always yields the same index.
pub fn hash(key: &str, round: usize, q: usize) -> Result<usize> {
    positive("q", q)?;
    digest_index(transform(key, round).as_bytes(), q)
}

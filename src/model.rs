// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! Closed-form false positive model.

use crate::error::{positive, Result};

/// Probability that a key which was never inserted is reported as present by
/// a filter of `q` bits with `k` hash rounds holding `n` keys:
///
/// P<sub>fp</sub>(k, q, n) = (1 - (1 - 1/q)<sup>kn</sup>)<sup>k</sup>
///
/// This assumes every round picks a bit independently and uniformly. Very
/// large `k·n` drives `(1 - 1/q)^(kn)` to zero, which saturates the result
/// at `1`.
pub fn false_positive_probability(k: usize, q: usize, n: usize) -> Result<f64> {
    let q = positive("q", q)? as f64;
    let k = k as f64;
    let zero_bit = (1. - 1. / q).powf(k * n as f64);

    Ok((1. - zero_bit).powf(k))
}

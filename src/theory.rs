// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! Analytic search for `(q, k)` given only the number of keys.
use std::f64;

use tracing::info;

use crate::bloom::optimal_bits;
use crate::error::{positive, Error, Result};
use crate::model::false_positive_probability;

/// Default multiple of `N` used as the largest `q` searched.
pub const DEFAULT_Q_FACTOR: usize = 10;
/// Default exclusive upper bound on `k`.
pub const DEFAULT_MAX_HASHES: usize = 20;

/// Search bounds for the [`TheoreticalOptimizer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TheoryConfig {
    /// `q` is searched in `1..=q_factor * N`.
    pub q_factor: usize,
    /// `k` is searched in `1..max_hashes`.
    pub max_hashes: usize,
}

impl TheoryConfig {
    /// Set the multiple of `N` bounding `q`.
    pub fn with_q_factor(mut self, q_factor: usize) -> Self {
        self.q_factor = q_factor;
        self
    }

    /// Set the exclusive upper bound on `k`.
    pub fn with_max_hashes(mut self, max_hashes: usize) -> Self {
        self.max_hashes = max_hashes;
        self
    }
}

impl Default for TheoryConfig {
    fn default() -> Self {
        Self {
            q_factor: DEFAULT_Q_FACTOR,
            max_hashes: DEFAULT_MAX_HASHES,
        }
    }
}

/// A `(q, k)` pair together with its modelled false positive probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimate {
    /// Modelled false positive probability at `(q, k)`.
    pub probability: f64,
    /// Bit-array length.
    pub q: usize,
    /// Number of hash rounds.
    pub k: usize,
}

/// Grid search over `(q, k)` against the closed-form false positive model.
#[derive(Clone, Copy, Debug, Default)]
pub struct TheoreticalOptimizer {
    config: TheoryConfig,
}

impl TheoreticalOptimizer {
    /// Create an optimizer with the given search bounds.
    pub fn new(config: TheoryConfig) -> Self {
        Self { config }
    }

    /// Return the search bounds.
    pub fn config(&self) -> &TheoryConfig {
        &self.config
    }

    /// Find the `(q, k)` with the lowest modelled false positive probability
    /// for `n` keys.
    ///
    /// The search starts from `(q_factor * n, 1)` and visits every `q` in
    /// `1..=q_factor * n` and, for each, every `k` in `1..max_hashes`. A pair
    /// only replaces the current best if it is strictly better, so the first
    /// pair found wins ties.
    pub fn optimize(&self, n: usize) -> Result<Estimate> {
        let n = positive("n", n)?;
        let q_factor = positive("q_factor", self.config.q_factor)?;
        let max_q = q_factor
            .checked_mul(n)
            .ok_or(Error::invalid("n", n))?;
        let max_hashes = self.config.max_hashes;

        let seed = Estimate {
            probability: false_positive_probability(1, max_q, n)?,
            q: max_q,
            k: 1,
        };
        let best = (1..=max_q)
            .flat_map(|q| (1..max_hashes).map(move |k| (q, k)))
            .try_fold(seed, |best, (q, k)| {
                let probability = false_positive_probability(k, q, n)?;

                Ok::<_, Error>(if probability < best.probability {
                    Estimate { probability, q, k }
                } else {
                    best
                })
            })?;

        info!(
            n,
            q = best.q,
            k = best.k,
            probability = best.probability,
            "theoretical optimum"
        );
        Ok(best)
    }
}

/// Derive `(q, k)` for `n` keys and a target false positive rate from the
/// continuous optimum: `q = -n·ln(fp) / ln²2` and `k = -ln(fp) / ln 2`, both
/// rounded up.
///
/// This is `O(1)`, unlike [`TheoreticalOptimizer::optimize`], which suits
/// large `n`. The returned probability is the model evaluated at the rounded
/// pair.
pub fn closed_form(n: usize, target_fp: f64) -> Result<Estimate> {
    let n = positive("n", n)?;
    if !(target_fp > 0. && target_fp < 1.) {
        return Err(Error::InvalidRate(target_fp));
    }
    let q = optimal_bits(n, target_fp).max(1);
    let k = ((-target_fp.ln() / f64::consts::LN_2).ceil() as usize).max(1);

    Ok(Estimate {
        probability: false_positive_probability(k, q, n)?,
        q,
        k,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
    }

    #[test]
    fn test_optimize() {
        let optimizer = TheoreticalOptimizer::default();

        let est = optimizer.optimize(1).unwrap();
        assert_eq!((est.q, est.k), (10, 7));
        assert_close(est.probability, 0.010518744866970343);

        let est = optimizer.optimize(10).unwrap();
        assert_eq!((est.q, est.k), (100, 7));
        assert_close(est.probability, 0.008394807630049763);

        let est = optimizer.optimize(100).unwrap();
        assert_eq!((est.q, est.k), (1000, 7));
        assert_close(est.probability, 0.008213554634050255);
    }

    #[test]
    fn test_optimize_with_bounded_hashes() {
        let optimizer = TheoreticalOptimizer::new(TheoryConfig::default().with_max_hashes(3));
        let est = optimizer.optimize(10).unwrap();

        assert_eq!((est.q, est.k), (100, 2));
        assert_close(est.probability, 0.03315788337521881);
    }

    #[test]
    fn test_empty_grid_keeps_seed() {
        let optimizer = TheoreticalOptimizer::new(TheoryConfig::default().with_max_hashes(1));
        let est = optimizer.optimize(10).unwrap();

        assert_eq!((est.q, est.k), (100, 1));
        assert_close(
            est.probability,
            false_positive_probability(1, 100, 10).unwrap(),
        );
    }

    #[test]
    fn test_invalid_inputs() {
        let optimizer = TheoreticalOptimizer::default();
        assert!(optimizer.optimize(0).is_err());

        let optimizer = TheoreticalOptimizer::new(TheoryConfig::default().with_q_factor(0));
        assert!(optimizer.optimize(10).is_err());
    }

    #[test]
    fn test_closed_form() {
        let est = closed_form(100, 0.01).unwrap();
        assert_eq!((est.q, est.k), (959, 7));
        assert_close(est.probability, 0.010039512564063135);

        let est = closed_form(10, 0.01).unwrap();
        assert_eq!((est.q, est.k), (96, 7));

        assert_eq!(closed_form(10, 0.), Err(Error::InvalidRate(0.)));
        assert_eq!(closed_form(10, 1.), Err(Error::InvalidRate(1.)));
        assert!(closed_form(10, f64::NAN).is_err());
        assert!(closed_form(0, 0.01).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_optimum_beats_seed(n in 1usize..60) {
            let est = TheoreticalOptimizer::default().optimize(n).unwrap();
            let seed = false_positive_probability(1, 10 * n, n).unwrap();

            prop_assert!(est.probability <= seed);
            prop_assert!((1..=10 * n).contains(&est.q));
            prop_assert!((1..20).contains(&est.k));
        }
    }
}

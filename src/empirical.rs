// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! Measured search for `(q, k)` around an analytic starting point.
//!
//! For every candidate pair in a [`SearchWindow`], one filter is built per
//! partition and queried with keys drawn uniformly from the whole key space.
//! A query whose answer differs from the partition's true membership counts
//! as an error; the candidate's score is the sum over partitions of
//! `errors / trials`.
//!
//! Only the trial sampling is random. The window is enumerated in a fixed
//! order and candidates are reduced in that order, so a seeded run is
//! reproducible whether or not candidates are measured in parallel.
use std::hash::{Hash, Hasher};
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use siphasher::sip::SipHasher13;
use tracing::{debug, info, trace};

use crate::bloom::BloomFilter;
use crate::error::{positive, Error, Result};
use crate::partition::Partitions;

/// Default half-width of the search window.
pub const DEFAULT_DELTA: usize = 5;
/// Default number of trial queries per partition.
pub const DEFAULT_TRIALS: usize = 1000;

/// Settings for the [`EmpiricalOptimizer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmpiricalConfig {
    /// Half-width of the window searched around the seed pair.
    pub delta: usize,
    /// Trial queries per partition and candidate.
    pub trials: usize,
    /// Seed for trial sampling. Unseeded runs draw from entropy.
    pub seed: Option<u64>,
    /// Measure candidates on the rayon thread pool.
    pub parallel: bool,
    /// Stop starting new candidates once this much time has passed.
    pub deadline: Option<Duration>,
}

impl EmpiricalConfig {
    /// Set the window half-width.
    pub fn with_delta(mut self, delta: usize) -> Self {
        self.delta = delta;
        self
    }

    /// Set the number of trials per partition.
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Seed trial sampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable parallel measurement.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Bound the time spent starting new candidates.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

impl Default for EmpiricalConfig {
    fn default() -> Self {
        Self {
            delta: DEFAULT_DELTA,
            trials: DEFAULT_TRIALS,
            seed: None,
            parallel: true,
            deadline: None,
        }
    }
}

/// The `(q, k)` ranges searched around a seed pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchWindow {
    q: RangeInclusive<usize>,
    k: RangeInclusive<usize>,
}

impl SearchWindow {
    /// Window of half-width `delta` around `(q0, k0)`.
    ///
    /// Each range spans `2·delta + 1` values. When it would reach zero, it is
    /// shifted up to start at `1` rather than cut short.
    pub fn around(q0: usize, k0: usize, delta: usize) -> Self {
        let window = Self {
            q: Self::range(q0, delta),
            k: Self::range(k0, delta),
        };
        trace!(q0, k0, delta, ?window, "search window");

        window
    }

    fn range(center: usize, delta: usize) -> RangeInclusive<usize> {
        if center > delta {
            center - delta..=center.saturating_add(delta)
        } else {
            1..=delta.saturating_mul(2).saturating_add(1)
        }
    }

    /// Bit-array lengths searched.
    pub fn q(&self) -> &RangeInclusive<usize> {
        &self.q
    }

    /// Hash round counts searched.
    pub fn k(&self) -> &RangeInclusive<usize> {
        &self.k
    }

    /// Whether `(q, k)` lies in the window.
    pub fn contains(&self, q: usize, k: usize) -> bool {
        self.q.contains(&q) && self.k.contains(&k)
    }

    /// Number of candidate pairs.
    pub fn len(&self) -> usize {
        self.q.clone().count() * self.k.clone().count()
    }

    /// Whether the window has no candidates. Never true for a window built
    /// with [`SearchWindow::around`].
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Candidate `(q, k)` pairs, `k`-major, both ascending.
    pub fn candidates(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.k
            .clone()
            .flat_map(move |k| self.q.clone().map(move |q| (q, k)))
    }
}

/// Outcome of an empirical search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// Sum over partitions of the measured error rate.
    pub total_rate: f64,
    /// Bit-array length.
    pub q: usize,
    /// Number of hash rounds.
    pub k: usize,
    /// How many candidates were measured.
    pub evaluated: usize,
}

/// Measure the summed error rate of `(q, k)` over all partitions.
///
/// Each partition gets its own filter and `trials` queries with keys drawn
/// uniformly from `all_keys`. Any failure aborts the whole measurement, so a
/// partition is never silently left out of the sum.
pub fn measure<V, S>(
    q: usize,
    k: usize,
    partitions: &Partitions<V>,
    all_keys: &[S],
    trials: usize,
    rng: &mut fastrand::Rng,
) -> Result<f64>
where
    S: AsRef<str>,
{
    positive("trials", trials)?;
    if all_keys.is_empty() {
        return Err(Error::EmptyKeySpace);
    }

    let mut total = 0.;
    for partition in partitions {
        let filter = BloomFilter::build(k, q, partition.keys())?;
        let errors = (0..trials)
            .filter(|_| {
                let key = all_keys[rng.usize(..all_keys.len())].as_ref();
                filter.may_contain(key) != partition.contains(key)
            })
            .count();

        total += errors as f64 / trials as f64;
    }
    Ok(total)
}

/// Grid search over a [`SearchWindow`], scoring each pair with [`measure`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EmpiricalOptimizer {
    config: EmpiricalConfig,
}

impl EmpiricalOptimizer {
    /// Create an optimizer with the given settings.
    pub fn new(config: EmpiricalConfig) -> Self {
        Self { config }
    }

    /// Return the settings.
    pub fn config(&self) -> &EmpiricalConfig {
        &self.config
    }

    /// Search the window around `(q0, k0)` for the pair with the lowest
    /// summed error rate over `partitions`, drawing trial keys from
    /// `all_keys`.
    ///
    /// The first measured candidate always replaces the seed; after that a
    /// candidate must be strictly better, so ties go to the earliest pair.
    /// If the deadline passes before any candidate is measured, the seed is
    /// returned with a rate of `1.0` and `evaluated = 0`.
    pub fn optimize<V, S>(
        &self,
        q0: usize,
        k0: usize,
        partitions: &Partitions<V>,
        all_keys: &[S],
    ) -> Result<Measurement>
    where
        V: Sync,
        S: AsRef<str> + Sync,
    {
        positive("q0", q0)?;
        positive("k0", k0)?;
        positive("trials", self.config.trials)?;
        if all_keys.is_empty() {
            return Err(Error::EmptyKeySpace);
        }

        let started = Instant::now();
        let window = SearchWindow::around(q0, k0, self.config.delta);
        let candidates: Vec<(usize, usize)> = window.candidates().collect();

        let evaluate = |&(q, k): &(usize, usize)| -> Result<Option<(f64, usize, usize)>> {
            if let Some(deadline) = self.config.deadline {
                if started.elapsed() >= deadline {
                    return Ok(None);
                }
            }
            let mut rng = self.rng(q, k);
            let rate = measure(q, k, partitions, all_keys, self.config.trials, &mut rng)?;
            debug!(q, k, rate, "measured candidate");

            Ok(Some((rate, q, k)))
        };
        let measured: Vec<Option<(f64, usize, usize)>> = if self.config.parallel {
            candidates.par_iter().map(evaluate).collect::<Result<_>>()?
        } else {
            candidates.iter().map(evaluate).collect::<Result<_>>()?
        };

        let evaluated = measured.iter().flatten().count();
        let best = measured
            .into_iter()
            .flatten()
            .fold(None, |best: Option<(f64, usize, usize)>, candidate| match best {
                Some(best) if best.0 <= candidate.0 => Some(best),
                _ => Some(candidate),
            });
        let (total_rate, q, k) = best.unwrap_or((1., q0, k0));

        info!(
            q,
            k,
            total_rate,
            evaluated,
            candidates = window.len(),
            elapsed = ?started.elapsed(),
            "empirical optimum"
        );
        Ok(Measurement {
            total_rate,
            q,
            k,
            evaluated,
        })
    }

    /// Trial generator for one candidate. Seeded runs derive an independent
    /// stream per `(q, k)`, so the outcome doesn't depend on scheduling.
    fn rng(&self, q: usize, k: usize) -> fastrand::Rng {
        match self.config.seed {
            Some(seed) => {
                let mut hasher = SipHasher13::new_with_keys(seed, 0);
                (q, k).hash(&mut hasher);

                fastrand::Rng::with_seed(hasher.finish())
            }
            None => fastrand::Rng::new(),
        }
    }
}

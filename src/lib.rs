//! A Bloom filter over string keys, and a two-stage search for its size `q`
//! and hash round count `k`.
//!
//! # Bloom Filters
//!
//! A Bloom filter is a space-efficient probabilistic data structure that is
//! used to test whether an element is a member of a set. It allows for queries
//! to return: "possibly in set" or "definitely not in set". The filters here
//! are built once from a complete key set and never change afterwards.
//!
//! # Hashing
//!
//! Round `i` of a key's `k` rounds rewrites the key by placing the decimal
//! form of `i` after, before, or in the middle of it (depending on `i mod 3`),
//! and takes the SHA-256 digest of the result modulo `q`.
//!
//! # Choosing `q` and `k`
//!
//! 1. [`TheoreticalOptimizer`] minimises the false positive model
//!    (1 - (1 - 1/q)<sup>kN</sup>)<sup>k</sup> over a grid, given only the
//!    number of keys `N`.
//! 2. [`EmpiricalOptimizer`] searches a window around that pair against real
//!    data: keys are grouped by attribute value ([`Partitions`]), one filter
//!    is built per group, and each group is queried with keys drawn from the
//!    whole key space. The pair with the fewest wrong answers wins.
//!
//! # Example
//!
//! ```
//! use bloomopt::{EmpiricalConfig, EmpiricalOptimizer, Partitions, TheoreticalOptimizer};
//!
//! let records: Vec<(String, u32)> = (0..40).map(|i| (format!("id{i}"), i % 4)).collect();
//! let keys: Vec<String> = records.iter().map(|(k, _)| k.clone()).collect();
//! let partitions = Partitions::from_records(records);
//!
//! let seed = TheoreticalOptimizer::default().optimize(keys.len()).unwrap();
//! let optimizer = EmpiricalOptimizer::new(EmpiricalConfig::default().with_trials(100));
//! let result = optimizer.optimize(seed.q, seed.k, &partitions, &keys).unwrap();
//!
//! assert!(result.total_rate < 1.0);
//! ```
#![warn(missing_docs)]
#![allow(clippy::bool_assert_comparison)]

pub mod bitvec;
pub mod bloom;
pub mod empirical;
pub mod error;
pub mod hash;
pub mod model;
pub mod partition;
pub mod runlog;
pub mod theory;

pub use bloom::BloomFilter;
pub use empirical::{EmpiricalConfig, EmpiricalOptimizer, Measurement, SearchWindow};
pub use error::{Error, Result};
pub use model::false_positive_probability;
pub use partition::{Partition, PartitionKey, Partitions};
pub use runlog::{RunLog, RunRecord};
pub use theory::{Estimate, TheoreticalOptimizer, TheoryConfig};

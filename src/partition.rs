// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! Grouping of record keys by attribute value.
//!
//! Each group becomes one filter during the empirical search, answering "does
//! key `K` have value `v`?". The universal partition holds every key and is
//! the pool trial keys are drawn from.
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Identifies a partition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PartitionKey<V> {
    /// The partition holding every record key.
    Universal,
    /// The partition of keys mapped to this attribute value.
    Value(V),
}

/// The record keys sharing one [`PartitionKey`].
#[derive(Clone, Debug)]
pub struct Partition<V> {
    key: PartitionKey<V>,
    keys: Vec<String>,
    lookup: HashSet<String>,
}

impl<V> Partition<V> {
    fn new(key: PartitionKey<V>) -> Self {
        Self {
            key,
            keys: Vec::new(),
            lookup: HashSet::new(),
        }
    }

    fn push(&mut self, key: String) {
        self.lookup.insert(key.clone());
        self.keys.push(key);
    }

    /// Which partition this is.
    pub fn key(&self) -> &PartitionKey<V> {
        &self.key
    }

    /// Record keys in insertion order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of record keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the partition has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Ground truth membership of a record key.
    pub fn contains(&self, key: &str) -> bool {
        self.lookup.contains(key)
    }
}

/// Record keys grouped by attribute value, plus the universal partition.
///
/// Partitions are kept in the order their value was first seen, with the
/// universal partition first.
#[derive(Clone, Debug)]
pub struct Partitions<V> {
    partitions: Vec<Partition<V>>,
    index: HashMap<V, usize>,
}

impl<V: Clone + Eq + Hash> Partitions<V> {
    /// Group `(record key, attribute value)` pairs by value.
    ///
    /// Every key is appended to its value's partition and to the universal
    /// partition. Record keys are expected to be unique.
    pub fn from_records<I, K>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let mut partitions = Self {
            partitions: vec![Partition::new(PartitionKey::Universal)],
            index: HashMap::new(),
        };
        for (key, value) in records {
            partitions.push(key.into(), value);
        }
        partitions
    }

    fn push(&mut self, key: String, value: V) {
        let next = self.partitions.len();
        let slot = *self.index.entry(value.clone()).or_insert(next);

        if slot == next {
            self.partitions.push(Partition::new(PartitionKey::Value(value)));
        }
        self.partitions[slot].push(key.clone());
        self.partitions[0].push(key);
    }

    /// Look up a partition.
    pub fn get(&self, key: &PartitionKey<V>) -> Option<&Partition<V>> {
        match key {
            PartitionKey::Universal => self.partitions.first(),
            PartitionKey::Value(v) => self.index.get(v).map(|i| &self.partitions[*i]),
        }
    }
}

impl<V> Partitions<V> {
    /// The partition holding every record key.
    pub fn universal(&self) -> &Partition<V> {
        &self.partitions[0]
    }

    /// Iterate over all partitions, universal first.
    pub fn iter(&self) -> std::slice::Iter<'_, Partition<V>> {
        self.partitions.iter()
    }

    /// Number of partitions, including the universal one.
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Whether there are no records at all.
    pub fn is_empty(&self) -> bool {
        self.universal().is_empty()
    }

    /// Number of records partitioned.
    pub fn num_records(&self) -> usize {
        self.universal().len()
    }
}

impl<'a, V> IntoIterator for &'a Partitions<V> {
    type Item = &'a Partition<V>;
    type IntoIter = std::slice::Iter<'a, Partition<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Group `(record key, attribute value)` pairs by value.
pub fn partition<I, K, V>(records: I) -> Partitions<V>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Clone + Eq + Hash,
{
    Partitions::from_records(records)
}

// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! Accumulates the outcome of repeated optimizer runs.
use std::io;
use std::time::Duration;

use crate::empirical::Measurement;

/// One optimizer run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunRecord {
    /// Lowest total false positive rate found.
    pub min_fp: f64,
    /// Chosen bit-array length.
    pub q: usize,
    /// Chosen number of hash rounds.
    pub k: usize,
    /// Wall-clock time the run took.
    pub elapsed: Duration,
}

impl RunRecord {
    /// Record a measurement and how long it took.
    pub fn new(measurement: &Measurement, elapsed: Duration) -> Self {
        Self {
            min_fp: measurement.total_rate,
            q: measurement.q,
            k: measurement.k,
            elapsed,
        }
    }
}

/// Caller-owned log of [`RunRecord`]s.
#[derive(Clone, Debug, Default)]
pub struct RunLog {
    records: Vec<RunRecord>,
}

impl RunLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a run.
    pub fn push(&mut self, record: RunRecord) {
        self.records.push(record);
    }

    /// All runs, in the order they were pushed.
    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no runs were logged.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mean of `min_fp` over all runs.
    pub fn mean_rate(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let sum: f64 = self.records.iter().map(|r| r.min_fp).sum();

        Some(sum / self.len() as f64)
    }

    /// Mean run time.
    pub fn mean_elapsed(&self) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }
        let sum: Duration = self.records.iter().map(|r| r.elapsed).sum();

        Some(sum / self.len() as u32)
    }

    /// Run with the lowest `min_fp`; the earliest wins ties.
    pub fn best(&self) -> Option<&RunRecord> {
        self.records
            .iter()
            .fold(None, |best: Option<&RunRecord>, r| match best {
                Some(b) if b.min_fp <= r.min_fp => Some(b),
                _ => Some(r),
            })
    }

    /// Write the log as CSV with a `min_fp,q,k,elapsed_time` header, the
    /// elapsed time in seconds.
    pub fn write_csv<W: io::Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "min_fp,q,k,elapsed_time")?;
        for r in &self.records {
            writeln!(w, "{},{},{},{}", r.min_fp, r.q, r.k, r.elapsed.as_secs_f64())?;
        }
        w.flush()
    }
}

impl Extend<RunRecord> for RunLog {
    fn extend<T: IntoIterator<Item = RunRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}

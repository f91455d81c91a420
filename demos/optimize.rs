//! Pick `(q, k)` for a synthetic dataset, repeating the empirical search a
//! few times and printing each run as CSV.
//!
//! Run with `RUST_LOG=bloomopt=debug` to see every candidate measured.
use std::time::Instant;

use bloomopt::{
    EmpiricalConfig, EmpiricalOptimizer, Partitions, RunLog, RunRecord, TheoreticalOptimizer,
};
use tracing_subscriber::EnvFilter;

/// Number of empirical runs.
const RUNS: usize = 5;
/// Number of distinct attribute values.
const WARDS: u32 = 50;

/// A contiguous slice of `(record id, ward)` rows starting at a random offset.
/// Low wards are more common than high ones.
fn records(rng: &fastrand::Rng) -> Vec<(String, u32)> {
    let start = rng.u64(1..100_000);
    let len = rng.u64(30..=300);

    (start..start + len)
        .map(|id| {
            let ward = rng.u32(1..=WARDS).min(rng.u32(1..=WARDS));
            (format!("{}", 10_000_000 + id), ward)
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rng = fastrand::Rng::new();
    let records = records(&rng);
    let keys: Vec<String> = records.iter().map(|(k, _)| k.clone()).collect();
    let partitions = Partitions::from_records(records);

    let seed = TheoreticalOptimizer::default().optimize(keys.len())?;
    eprintln!(
        "{} records in {} partitions; theoretical q = {}, k = {}, p = {}",
        keys.len(),
        partitions.len(),
        seed.q,
        seed.k,
        seed.probability
    );

    let optimizer = EmpiricalOptimizer::new(EmpiricalConfig::default());
    let mut log = RunLog::new();
    for _ in 0..RUNS {
        let started = Instant::now();
        let result = optimizer.optimize(seed.q, seed.k, &partitions, &keys)?;

        log.push(RunRecord::new(&result, started.elapsed()));
    }
    log.write_csv(std::io::stdout().lock())?;

    if let (Some(best), Some(rate)) = (log.best(), log.mean_rate()) {
        eprintln!(
            "best q = {}, k = {} ({}); mean rate {}",
            best.q, best.k, best.min_fp, rate
        );
    }
    Ok(())
}

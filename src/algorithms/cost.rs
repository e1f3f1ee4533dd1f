//! Runtime estimates for a single pairwise alignment.
//!
//! Local alignment fills an `n * m` matrix, so the work for one combination is
//! proportional to the product of both sequence lengths. Dividing by the
//! worker's benchmark (cells per second) gives an estimate of wall-clock time.

/// Estimated seconds a worker with the given throughput needs for one pair.
pub fn estimate_work_in_seconds(target: &str, query: &str, throughput: u64) -> u64 {
    cells(target, query) / throughput.max(1)
}

/// Same estimate in milliseconds, used for the slow-worker check.
pub fn estimate_work_in_ms(target: &str, query: &str, throughput: u64) -> u64 {
    cells(target, query).saturating_mul(1000) / throughput.max(1)
}

fn cells(target: &str, query: &str) -> u64 {
    (target.len() as u64).saturating_mul(query.len() as u64)
}

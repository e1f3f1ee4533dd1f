use crate::models::{TargetQueryCombination, Worker};

pub const MIN_SEQUENCES_PER_WORKER: usize = 20;

/// Splits the backlog of the oldest job by the requesting worker's share of
/// the total idle benchmark capacity.
#[derive(Debug, Clone)]
pub struct ProportionalScheduler {
    pub min_batch_size: usize,
}

impl Default for ProportionalScheduler {
    fn default() -> Self {
        Self {
            min_batch_size: MIN_SEQUENCES_PER_WORKER,
        }
    }
}

impl ProportionalScheduler {
    pub fn new(min_batch_size: usize) -> Self {
        Self { min_batch_size }
    }

    pub fn select(
        &self,
        missing: Vec<TargetQueryCombination>,
        worker: &Worker,
        idle_workers: &[Worker],
    ) -> Vec<TargetQueryCombination> {
        let total_processing_power: u64 = idle_workers
            .iter()
            .map(|w| w.resources.benchmark_result)
            .sum();
        let amount = batch_size(
            worker.resources.benchmark_result,
            total_processing_power,
            missing.len(),
            self.min_batch_size,
        );

        tracing::debug!(
            worker_id = %worker.id,
            total_processing_power,
            amount,
            missing = missing.len(),
            "Proportional batch"
        );
        missing.into_iter().take(amount).collect()
    }
}

/// `ceil(own / max(total, own) * missing)`, clamped to `[floor, missing]`.
///
/// The requesting worker may itself not be idle, hence the `max`.
pub fn batch_size(own: u64, total: u64, missing: usize, floor: usize) -> usize {
    let proportion = own as f64 / total.max(own).max(1) as f64;
    let amount = (proportion * missing as f64).ceil() as usize;
    amount.max(floor).min(missing)
}

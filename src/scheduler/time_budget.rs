use crate::algorithms::cost::estimate_work_in_seconds;
use crate::algorithms::knapsack::select_within_budget;
use crate::models::{TargetQueryCombination, Worker};
use crate::services::job::Job;

/// Packs as much estimated work as fits into a fixed time budget per package,
/// so every worker's round trip takes about the same time.
#[derive(Debug, Clone)]
pub struct TimeBudgetScheduler {
    pub seconds_per_package: u64,
}

impl Default for TimeBudgetScheduler {
    fn default() -> Self {
        Self {
            seconds_per_package: 3 * 60,
        }
    }
}

impl TimeBudgetScheduler {
    pub fn new(seconds_per_package: u64) -> Self {
        Self {
            seconds_per_package,
        }
    }

    pub fn select(
        &self,
        job: &Job,
        missing: Vec<TargetQueryCombination>,
        worker: &Worker,
    ) -> Vec<TargetQueryCombination> {
        let costs = estimate_costs(job, &missing, worker.resources.throughput());
        let chosen = select_within_budget(&costs, self.seconds_per_package);

        tracing::debug!(
            worker_id = %worker.id,
            budget = self.seconds_per_package,
            planned_seconds = chosen.iter().map(|&i| costs[i]).sum::<u64>(),
            amount = chosen.len(),
            "Time budget batch"
        );
        chosen.into_iter().map(|i| missing[i].clone()).collect()
    }
}

/// Whole-second estimate per combination; anything under a second counts as
/// one so packages of tiny pairs stay bounded too.
fn estimate_costs(job: &Job, missing: &[TargetQueryCombination], throughput: u64) -> Vec<u64> {
    missing
        .iter()
        .map(|c| {
            let target = job.sequence(&c.target).map(String::as_str).unwrap_or("");
            let query = job.sequence(&c.query).map(String::as_str).unwrap_or("");
            estimate_work_in_seconds(target, query, throughput).max(1)
        })
        .collect()
}

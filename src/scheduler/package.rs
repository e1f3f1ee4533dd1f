use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::algorithms::cost::estimate_work_in_ms;
use crate::models::{
    RawWorkPackage, ScoringParameters, Sequence, SequenceId, TargetQueryCombination, WorkPackage,
    Worker,
};
use crate::services::job::Job;

/// Grace period before a package without progress counts as too slow
const SLOW_GRACE: Duration = Duration::from_secs(60);
/// How many times slower than estimated a worker may be
const SLOW_FACTOR: f64 = 10.0;

/// Snapshot of one assignment: the offered combinations and exactly the
/// sequences needed to compute them.
#[derive(Debug, Clone)]
pub struct InternalWorkPackage {
    pub id: Uuid,
    pub job_id: Uuid,
    pub queries: Vec<TargetQueryCombination>,
    pub sequences: HashMap<SequenceId, Sequence>,
    pub scoring: ScoringParameters,
}

impl InternalWorkPackage {
    pub fn new(job: &Job, queries: Vec<TargetQueryCombination>) -> Self {
        let mut sequences = HashMap::new();
        for combination in &queries {
            for id in [&combination.target, &combination.query] {
                if let Some(sequence) = job.sequence(id) {
                    sequences
                        .entry(id.clone())
                        .or_insert_with(|| sequence.clone());
                }
            }
        }

        Self {
            id: Uuid::new_v4(),
            job_id: job.id,
            queries,
            sequences,
            scoring: job.scoring,
        }
    }

    pub fn offers(&self, combination: &TargetQueryCombination) -> bool {
        self.queries.contains(combination)
    }

    /// Sum of the per-pair estimates for a worker with the given throughput.
    pub fn expected_ms(&self, throughput: u64) -> u64 {
        self.queries
            .iter()
            .filter_map(|c| {
                let target = self.sequences.get(&c.target)?;
                let query = self.sequences.get(&c.query)?;
                Some(estimate_work_in_ms(target, query, throughput))
            })
            .fold(0u64, u64::saturating_add)
    }

    pub fn to_wire(&self) -> WorkPackage {
        WorkPackage {
            id: self.id,
            job_id: self.job_id,
            queries: self.queries.clone(),
            sequences: self.sequences.clone(),
            scoring: self.scoring,
        }
    }

    pub fn to_raw(&self) -> RawWorkPackage {
        RawWorkPackage {
            id: self.id,
            job_id: self.job_id,
            queries: self.queries.clone(),
            scoring: self.scoring,
        }
    }
}

/// An [`InternalWorkPackage`] together with who got it and when.
#[derive(Debug, Clone)]
pub struct ScheduledWorkPackage {
    pub package: Arc<InternalWorkPackage>,
    pub worker_id: Uuid,
    pub start_time: Instant,
    pub expected_ms: u64,
}

impl ScheduledWorkPackage {
    pub fn new(package: InternalWorkPackage, worker: &Worker) -> Self {
        let expected_ms = package.expected_ms(worker.resources.throughput());
        Self {
            package: Arc::new(package),
            worker_id: worker.id,
            start_time: Instant::now(),
            expected_ms,
        }
    }

    pub fn id(&self) -> Uuid {
        self.package.id
    }

    pub fn job_id(&self) -> Uuid {
        self.package.job_id
    }

    /// Fraction of the offered combinations the job already has results for.
    pub fn percentage_done(&self, job: &Job) -> f64 {
        if self.package.queries.is_empty() {
            return 1.0;
        }
        let completed = self
            .package
            .queries
            .iter()
            .filter(|c| job.completed.contains_key(*c))
            .count();
        completed as f64 / self.package.queries.len() as f64
    }

    pub fn done(&self, job: &Job) -> bool {
        self.package
            .queries
            .iter()
            .all(|c| job.completed.contains_key(c))
    }

    /// True if the worker is more than ten times slower than its own
    /// estimated pace, after a one minute grace period.
    pub fn is_too_slow(&self, job: &Job, now: Instant) -> bool {
        let allowed_ms = self.percentage_done(job) * self.expected_ms as f64 * SLOW_FACTOR;
        self.start_time + Duration::from_millis(allowed_ms as u64) + SLOW_GRACE < now
    }
}

pub mod package;
pub mod primitive;
pub mod proportional;
pub mod time_budget;

pub use package::{InternalWorkPackage, ScheduledWorkPackage};
pub use primitive::PrimitiveScheduler;
pub use proportional::ProportionalScheduler;
pub use time_budget::TimeBudgetScheduler;

use crate::config::{SchedulerConfig, SchedulerKind};
use crate::models::Worker;
use crate::services::job_queue::JobQueue;

/// The strategy deciding how many of the oldest job's missing combinations
/// go into the next work package.
#[derive(Debug, Clone)]
pub enum WorkScheduler {
    Primitive(PrimitiveScheduler),
    Proportional(ProportionalScheduler),
    Time(TimeBudgetScheduler),
}

impl WorkScheduler {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        match config.kind {
            SchedulerKind::Primitive => Self::Primitive(PrimitiveScheduler),
            SchedulerKind::Proportional => {
                Self::Proportional(ProportionalScheduler::new(config.min_batch_size))
            }
            SchedulerKind::Time => Self::Time(TimeBudgetScheduler::new(config.time_split_seconds)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::Proportional(_) => "proportional",
            Self::Time(_) => "time",
        }
    }

    /// Builds the next package for `worker` and marks its combinations as in
    /// progress on the job. Returns `None` if no job has unassigned work.
    ///
    /// The caller holds the queue's write lock for the whole call, so two
    /// packages never share a combination.
    pub fn schedule_work_for(
        &self,
        queue: &mut JobQueue,
        worker: &Worker,
        idle_workers: &[Worker],
    ) -> Option<ScheduledWorkPackage> {
        let job = queue.first_job_with_unassigned_sequences()?;
        let missing = job.missing_sequences();

        let queries = match self {
            Self::Primitive(s) => s.select(missing),
            Self::Proportional(s) => s.select(missing, worker, idle_workers),
            Self::Time(s) => s.select(job, missing, worker),
        };
        if queries.is_empty() {
            return None;
        }

        let package = InternalWorkPackage::new(job, queries);
        job.in_progress.extend(package.queries.iter().cloned());
        let scheduled = ScheduledWorkPackage::new(package, worker);

        tracing::info!(
            scheduler = self.name(),
            job_id = %scheduled.job_id(),
            package_id = %scheduled.id(),
            worker_id = %worker.id,
            combinations = scheduled.package.queries.len(),
            expected_ms = scheduled.expected_ms,
            "Work package scheduled"
        );
        Some(scheduled)
    }

    /// Returns the package's unfinished combinations to the job's missing set.
    /// Safe to call more than once and after the job is gone.
    pub fn abort_work_package(&self, queue: &mut JobQueue, package: &ScheduledWorkPackage) -> usize {
        let Ok(job) = queue.get_mut(&package.job_id()) else {
            return 0;
        };
        let released = package
            .package
            .queries
            .iter()
            .filter(|c| job.in_progress.remove(*c))
            .count();

        if released > 0 {
            tracing::info!(
                job_id = %job.id,
                package_id = %package.id(),
                released,
                "Work package aborted"
            );
        }
        released
    }
}

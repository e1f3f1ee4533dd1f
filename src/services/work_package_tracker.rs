use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::algorithms::verify::verify_result;
use crate::background::Cleaner;
use crate::errors::{AppError, AppResult};
use crate::models::{RawWorkPackage, Sequence, WorkPackage, WorkResult, WorkStatus, WorkerStatus};
use crate::scheduler::{ScheduledWorkPackage, WorkScheduler};
use crate::services::job::Job;
use crate::services::job_queue::SharedJobQueue;
use crate::services::worker_registry::WorkerRegistry;

/// Every work package currently out with a worker, and the logic merging
/// their results back into the jobs.
///
/// Locks are always taken in the order job queue, live packages, worker
/// registry.
pub struct WorkPackageTracker {
    jobs: SharedJobQueue,
    workers: Arc<WorkerRegistry>,
    scheduler: WorkScheduler,
    packages: Mutex<HashMap<Uuid, ScheduledWorkPackage>>,
    verify_results: bool,
}

impl WorkPackageTracker {
    pub fn new(
        jobs: SharedJobQueue,
        workers: Arc<WorkerRegistry>,
        scheduler: WorkScheduler,
        verify_results: bool,
    ) -> Self {
        Self {
            jobs,
            workers,
            scheduler,
            packages: Mutex::new(HashMap::new()),
            verify_results,
        }
    }

    /// Next package for the worker, with the sequences it needs.
    pub async fn dispatch(&self, worker_id: Uuid) -> AppResult<Option<WorkPackage>> {
        let scheduled = self.schedule(worker_id).await?;
        Ok(scheduled.map(|s| s.package.to_wire()))
    }

    /// Next package for the worker, which fetches sequences on demand.
    pub async fn dispatch_raw(&self, worker_id: Uuid) -> AppResult<Option<RawWorkPackage>> {
        let scheduled = self.schedule(worker_id).await?;
        Ok(scheduled.map(|s| s.package.to_raw()))
    }

    async fn schedule(&self, worker_id: Uuid) -> AppResult<Option<ScheduledWorkPackage>> {
        let worker = self.workers.get(worker_id).await?;

        let mut jobs = self.jobs.write().await;
        let mut packages = self.packages.lock().await;
        let idle_workers = self.workers.idle_workers().await;

        let Some(scheduled) = self
            .scheduler
            .schedule_work_for(&mut jobs, &worker, &idle_workers)
        else {
            tracing::debug!(worker_id = %worker_id, "No work available");
            return Ok(None);
        };

        // The worker may have been evicted since it was looked up
        if let Err(e) = self.workers.set_status(worker_id, WorkerStatus::Working).await {
            self.scheduler.abort_work_package(&mut jobs, &scheduled);
            return Err(e);
        }
        packages.insert(scheduled.id(), scheduled.clone());
        Ok(Some(scheduled))
    }

    /// One sequence of a live package, for workers using raw packages.
    pub async fn sequence_for(&self, work_id: Uuid, sequence_id: &str) -> AppResult<Sequence> {
        let packages = self.packages.lock().await;
        let scheduled = packages
            .get(&work_id)
            .ok_or(AppError::WorkPackageNotFound(work_id))?;
        scheduled
            .package
            .sequences
            .get(sequence_id)
            .cloned()
            .ok_or_else(|| AppError::SequenceNotFound(sequence_id.to_string()))
    }

    pub async fn package_status(&self, work_id: Uuid) -> AppResult<WorkStatus> {
        let jobs = self.jobs.read().await;
        let packages = self.packages.lock().await;
        let scheduled = packages
            .get(&work_id)
            .ok_or(AppError::WorkPackageNotFound(work_id))?;
        let job = jobs.get(&scheduled.job_id())?;
        Ok(WorkStatus {
            percentage_done: scheduled.percentage_done(job),
        })
    }

    /// Merges a (possibly partial) result into the owning job.
    ///
    /// A result that fails verification is acknowledged like any other, but
    /// the job loses every accepted alignment, the package is aborted and the
    /// worker is removed.
    pub async fn submit_result(&self, work_id: Uuid, result: WorkResult) -> AppResult<()> {
        let mut jobs = self.jobs.write().await;
        let mut packages = self.packages.lock().await;

        let scheduled = packages
            .get(&work_id)
            .cloned()
            .ok_or(AppError::WorkPackageNotFound(work_id))?;
        let worker_id = scheduled.worker_id;

        if self.verify_results && !self.workers.is_alive(worker_id).await {
            tracing::warn!(
                work_id = %work_id,
                worker_id = %worker_id,
                "Discarding result from a worker that is not alive"
            );
            return Ok(());
        }

        let (offered, foreign): (Vec<_>, Vec<_>) = result
            .alignments
            .into_iter()
            .partition(|r| scheduled.package.offers(&r.combination));
        if !foreign.is_empty() {
            tracing::warn!(
                work_id = %work_id,
                ignored = foreign.len(),
                "Result contains combinations the package did not offer"
            );
        }

        if self.verify_results {
            let failure = offered.iter().find_map(|r| {
                verify_result(&scheduled.package.sequences, &scheduled.package.scoring, r)
                    .err()
                    .map(|e| (r.combination.clone(), e))
            });
            if let Some((combination, error)) = failure {
                let job = jobs.get_mut(&scheduled.job_id())?;
                let discarded = job.discard_results();
                tracing::warn!(
                    job_id = %job.id,
                    work_id = %work_id,
                    worker_id = %worker_id,
                    target = %combination.target,
                    query = %combination.query,
                    discarded,
                    "Verification failed: {}",
                    error
                );

                packages.remove(&work_id);
                self.scheduler.abort_work_package(&mut jobs, &scheduled);
                self.workers.remove(worker_id).await;
                return Ok(());
            }
        }

        let job = jobs.get_mut(&scheduled.job_id())?;
        let accepted = offered.len();
        for r in offered {
            job.record_alignment(r.combination, r.alignment);
        }
        tracing::debug!(work_id = %work_id, accepted, "Result merged");

        if job.mark_finished_if_done() {
            tracing::info!(
                job_id = %job.id,
                "Job done in {:?}",
                job.computation_time.unwrap_or_default()
            );
        }

        // Reports for reassigned combinations can finish other packages of the job too
        let finished = retire_done_packages(&mut packages, job);
        for done in &finished {
            tracing::info!(
                work_id = %done.id(),
                worker_id = %done.worker_id,
                "Work package done"
            );
            if !holds_packages(&packages, done.worker_id) {
                // Already evicted workers have nothing to go idle
                let _ = self
                    .workers
                    .set_status(done.worker_id, WorkerStatus::Idle)
                    .await;
            }
        }

        let retired = finished.iter().any(|done| done.id() == work_id);
        if !retired && scheduled.is_too_slow(job, Instant::now()) {
            tracing::warn!(
                work_id = %work_id,
                worker_id = %worker_id,
                expected_ms = scheduled.expected_ms,
                "Worker is too slow, removing it"
            );
            self.workers.remove(worker_id).await;
        }
        Ok(())
    }

    /// Removes the job together with its live packages; their workers go back to idle.
    pub async fn delete_job(&self, job_id: Uuid) -> AppResult<()> {
        let mut jobs = self.jobs.write().await;
        let mut packages = self.packages.lock().await;

        jobs.delete(&job_id)?;

        let mut released_workers = Vec::new();
        packages.retain(|_, p| {
            if p.job_id() == job_id {
                released_workers.push(p.worker_id);
                false
            } else {
                true
            }
        });
        for worker_id in released_workers {
            if !holds_packages(&packages, worker_id) {
                let _ = self.workers.set_status(worker_id, WorkerStatus::Idle).await;
            }
        }

        tracing::info!(job_id = %job_id, "Job deleted");
        Ok(())
    }

    /// Aborts every package whose worker is no longer registered.
    pub async fn reclaim_orphaned_packages(&self) -> usize {
        let mut jobs = self.jobs.write().await;
        let mut packages = self.packages.lock().await;

        let mut orphaned = Vec::new();
        for (id, scheduled) in packages.iter() {
            if !self.workers.is_registered(scheduled.worker_id).await {
                orphaned.push(*id);
            }
        }

        for id in &orphaned {
            if let Some(scheduled) = packages.remove(id) {
                let released = self.scheduler.abort_work_package(&mut jobs, &scheduled);
                tracing::info!(
                    work_id = %id,
                    worker_id = %scheduled.worker_id,
                    released,
                    "Reclaimed work package of dead worker"
                );
            }
        }
        orphaned.len()
    }

    #[cfg(test)]
    pub async fn live_packages(&self) -> usize {
        self.packages.lock().await.len()
    }
}

/// Removes every live package of the job whose combinations all have results.
fn retire_done_packages(
    packages: &mut HashMap<Uuid, ScheduledWorkPackage>,
    job: &Job,
) -> Vec<ScheduledWorkPackage> {
    let done: Vec<Uuid> = packages
        .values()
        .filter(|p| p.job_id() == job.id && p.done(job))
        .map(|p| p.id())
        .collect();
    done.iter().filter_map(|id| packages.remove(id)).collect()
}

fn holds_packages(packages: &HashMap<Uuid, ScheduledWorkPackage>, worker_id: Uuid) -> bool {
    packages.values().any(|p| p.worker_id == worker_id)
}

impl Cleaner for WorkPackageTracker {
    fn name(&self) -> &'static str {
        "work_package_tracker"
    }

    fn execute_clean(&self) -> impl Future<Output = ()> + Send {
        async move {
            self.reclaim_orphaned_packages().await;
        }
    }
}

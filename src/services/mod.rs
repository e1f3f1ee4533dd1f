pub mod job;
pub mod job_queue;
pub mod work_package_tracker;
pub mod worker_registry;

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::background::spawn_cleaner;
use crate::config::Config;
use crate::scheduler::WorkScheduler;

pub use job_queue::{JobQueue, SharedJobQueue};
pub use work_package_tracker::WorkPackageTracker;
pub use worker_registry::WorkerRegistry;

/// Handles to the master's stateful services, constructed once at start-up
/// and shared by every request handler.
#[derive(Clone)]
pub struct MasterServices {
    pub jobs: SharedJobQueue,
    pub workers: Arc<WorkerRegistry>,
    pub work_packages: Arc<WorkPackageTracker>,
}

impl MasterServices {
    pub fn new(config: &Config) -> Self {
        let jobs = JobQueue::shared();
        let workers = Arc::new(WorkerRegistry::new(config.worker.timeout()));
        let scheduler = WorkScheduler::from_config(&config.scheduler);
        tracing::info!(scheduler = scheduler.name(), "Using work scheduler");

        let work_packages = Arc::new(WorkPackageTracker::new(
            jobs.clone(),
            workers.clone(),
            scheduler,
            config.work_package.verify_results,
        ));

        Self {
            jobs,
            workers,
            work_packages,
        }
    }

    /// Starts the worker eviction and package reclamation loops.
    pub fn start_cleaners(&self, config: &Config) -> Vec<JoinHandle<()>> {
        vec![
            spawn_cleaner(self.workers.clone(), config.worker.cleaning_interval()),
            spawn_cleaner(
                self.work_packages.clone(),
                config.work_package.cleaning_interval(),
            ),
        ]
    }
}

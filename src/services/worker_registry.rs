use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use crate::background::Cleaner;
use crate::errors::{AppError, AppResult};
use crate::models::{Worker, WorkerResources, WorkerStatus};

/// Known workers and their liveness.
#[derive(Debug)]
pub struct WorkerRegistry {
    workers: RwLock<HashMap<Uuid, Worker>>,
    timeout: Duration,
}

impl WorkerRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            workers: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    /// Register a new worker
    pub async fn register(&self, resources: WorkerResources) -> Uuid {
        let worker = Worker::new(resources);
        let worker_id = worker.id;
        self.workers.write().await.insert(worker_id, worker);
        tracing::info!(
            worker_id = %worker_id,
            benchmark_result = resources.benchmark_result,
            "Worker registered"
        );
        worker_id
    }

    /// Update worker heartbeat
    pub async fn heartbeat(&self, worker_id: Uuid) -> AppResult<()> {
        let mut workers = self.workers.write().await;
        let worker = workers
            .get_mut(&worker_id)
            .ok_or(AppError::WorkerNotFound(worker_id))?;
        worker.last_seen_alive = Instant::now();
        tracing::trace!(worker_id = %worker_id, "Life pulse");
        Ok(())
    }

    pub async fn get(&self, worker_id: Uuid) -> AppResult<Worker> {
        self.workers
            .read()
            .await
            .get(&worker_id)
            .cloned()
            .ok_or(AppError::WorkerNotFound(worker_id))
    }

    /// Workers currently not busy with a package, including a requesting one
    pub async fn idle_workers(&self) -> Vec<Worker> {
        self.workers
            .read()
            .await
            .values()
            .filter(|w| w.status == WorkerStatus::Idle)
            .cloned()
            .collect()
    }

    pub fn is_worker_alive(&self, worker: &Worker) -> bool {
        worker.last_seen_alive.elapsed() < self.timeout && worker.status != WorkerStatus::Dead
    }

    pub async fn is_alive(&self, worker_id: Uuid) -> bool {
        self.workers
            .read()
            .await
            .get(&worker_id)
            .is_some_and(|w| self.is_worker_alive(w))
    }

    /// True while the worker is registered and not marked dead, even if its
    /// heartbeat is already stale.
    pub async fn is_registered(&self, worker_id: Uuid) -> bool {
        self.workers
            .read()
            .await
            .get(&worker_id)
            .is_some_and(|w| w.status != WorkerStatus::Dead)
    }

    pub async fn set_status(&self, worker_id: Uuid, status: WorkerStatus) -> AppResult<()> {
        let mut workers = self.workers.write().await;
        let worker = workers
            .get_mut(&worker_id)
            .ok_or(AppError::WorkerNotFound(worker_id))?;
        if worker.status != status {
            tracing::debug!(
                worker_id = %worker_id,
                "Worker status {:?} -> {:?}",
                worker.status,
                status
            );
            worker.status = status;
        }
        Ok(())
    }

    /// Forced eviction, e.g. after a fraudulent or far too slow result.
    pub async fn remove(&self, worker_id: Uuid) -> Option<Worker> {
        let removed = self.workers.write().await.remove(&worker_id);
        if removed.is_some() {
            tracing::warn!(worker_id = %worker_id, "Worker removed");
        }
        removed
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.workers.read().await.len()
    }

    /// Marks every worker with a stale heartbeat dead and drops it.
    pub async fn evict_dead_workers(&self) -> Vec<Uuid> {
        let mut workers = self.workers.write().await;
        let dead: Vec<Uuid> = workers
            .values()
            .filter(|w| !self.is_worker_alive(w))
            .map(|w| w.id)
            .collect();

        for worker_id in &dead {
            if let Some(mut worker) = workers.remove(worker_id) {
                worker.status = WorkerStatus::Dead;
                tracing::info!(
                    worker_id = %worker_id,
                    "Worker evicted after {:?} without heartbeat",
                    worker.last_seen_alive.elapsed()
                );
            }
        }
        dead
    }
}

impl Cleaner for WorkerRegistry {
    fn name(&self) -> &'static str {
        "worker_registry"
    }

    fn execute_clean(&self) -> impl Future<Output = ()> + Send {
        async move {
            self.evict_dead_workers().await;
        }
    }
}

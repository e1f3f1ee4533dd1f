use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::JobRequest;
use crate::services::job::Job;

pub type SharedJobQueue = Arc<RwLock<JobQueue>>;

/// Holds every submitted job in submission order.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: IndexMap<Uuid, Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedJobQueue {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Validate the request and queue it under a fresh id.
    pub fn add(&mut self, request: JobRequest) -> AppResult<&Job> {
        let id = Uuid::new_v4();
        let job = Job::new(id, request)?;
        tracing::info!(
            job_id = %id,
            combinations = job.queries.len(),
            sequences = job.sequences.len(),
            "Job queued"
        );
        Ok(self.jobs.entry(id).or_insert(job))
    }

    pub fn get(&self, id: &Uuid) -> AppResult<&Job> {
        self.jobs.get(id).ok_or(AppError::JobNotFound(*id))
    }

    pub fn get_mut(&mut self, id: &Uuid) -> AppResult<&mut Job> {
        self.jobs.get_mut(id).ok_or(AppError::JobNotFound(*id))
    }

    pub fn delete(&mut self, id: &Uuid) -> AppResult<Job> {
        self.jobs.shift_remove(id).ok_or(AppError::JobNotFound(*id))
    }

    pub fn unfinished_jobs(&self) -> Vec<&Job> {
        self.jobs.values().filter(|j| !j.done()).collect()
    }

    /// Unfinished jobs with at least one combination nobody is working on,
    /// oldest first.
    pub fn jobs_with_unassigned_sequences(&self) -> Vec<&Job> {
        self.unfinished_jobs()
            .into_iter()
            .filter(|j| j.has_missing_sequences())
            .collect()
    }

    /// The oldest job a scheduler can take work from.
    pub fn first_job_with_unassigned_sequences(&mut self) -> Option<&mut Job> {
        let id = self.jobs_with_unassigned_sequences().first()?.id;
        self.jobs.get_mut(&id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }
}

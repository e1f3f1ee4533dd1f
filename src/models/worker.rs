use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

/// Relative throughput of a worker, comparable to cells updated per second.
pub type BenchmarkResult = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorkerId {
    pub id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerResources {
    // determined using benchmarking of the actual workload
    pub benchmark_result: BenchmarkResult,
}

impl WorkerResources {
    /// Benchmark usable as a divisor.
    pub fn throughput(&self) -> u64 {
        self.benchmark_result.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerStatus {
    Idle,
    Working,
    Dead,
}

#[derive(Debug, Clone)]
pub struct Worker {
    pub id: Uuid,
    pub resources: WorkerResources,
    pub last_seen_alive: Instant,
    pub status: WorkerStatus,
}

impl Worker {
    pub fn new(resources: WorkerResources) -> Self {
        Self {
            id: Uuid::new_v4(),
            resources,
            last_seen_alive: Instant::now(),
            status: WorkerStatus::Idle,
        }
    }
}

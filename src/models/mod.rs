mod job;
mod work;
mod worker;

pub use job::{
    Alignment, JobId, JobRequest, JobResult, JobResultCombination, JobState, JobStatus,
    MultipartJobRequest, ScoringParameters, Sequence, SequenceId, TargetQueryCombination,
};
pub use work::{RawWorkPackage, WorkPackage, WorkResult, WorkResultCombination, WorkStatus};
pub use worker::{Worker, WorkerId, WorkerResources, WorkerStatus};

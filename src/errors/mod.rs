// Defines the error taxonomy of the master and a result type alias, using the thiserror crate.
use thiserror::Error;
use uuid::Uuid;

// Make the response module public
pub mod response;
pub mod verification;

// Re-export commonly used types
pub use verification::{AlignmentSide, VerificationError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Job with id {0} not found")]
    JobNotFound(Uuid),

    #[error("Worker with id {0} not found")]
    WorkerNotFound(Uuid),

    #[error("Work package with id {0} not found")]
    WorkPackageNotFound(Uuid),

    #[error("Sequence {0} not found")]
    SequenceNotFound(String),

    #[error("Job {0} is not done yet")]
    JobNotDone(Uuid),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload error: {0}")]
    Upload(String),
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;

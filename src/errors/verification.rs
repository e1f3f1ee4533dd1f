use std::fmt;
use thiserror::Error;

/// Which half of a reported alignment a check ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentSide {
    Query,
    Target,
}

impl fmt::Display for AlignmentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentSide::Query => write!(f, "query"),
            AlignmentSide::Target => write!(f, "target"),
        }
    }
}

/// Reasons a reported alignment is refused. Never sent back to the worker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Sequence {0} is not part of the work package")]
    UnknownSequence(String),

    #[error("Aligned {side} does not match the original sequence ending at index {end_index}")]
    NotAnchored { side: AlignmentSide, end_index: i64 },

    #[error("Aligned strings have lengths {query}/{target}, declared length is {declared}")]
    LengthMismatch {
        query: usize,
        target: usize,
        declared: usize,
    },

    #[error("Declared score {expected} but alignment scores {actual}")]
    ScoreMismatch { expected: i64, actual: i64 },
}

pub type VerificationResult = Result<(), VerificationError>;

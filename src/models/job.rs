use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub type SequenceId = String;
pub type Sequence = String;

/// One (target, query) pair that needs a single alignment computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetQueryCombination {
    pub target: SequenceId,
    pub query: SequenceId,
}

#[cfg(test)]
impl TargetQueryCombination {
    pub fn new(target: impl Into<SequenceId>, query: impl Into<SequenceId>) -> Self {
        Self {
            target: target.into(),
            query: query.into(),
        }
    }
}

/// Scoring used by workers and by the verifier. Penalties are subtracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringParameters {
    pub match_score: i64,
    pub mismatch_penalty: i64,
    pub gap_penalty: i64,
}

// Everything but the sequences, as sent in the JSON part of a multipart upload
#[derive(Debug, Clone, Deserialize)]
pub struct MultipartJobRequest {
    pub queries: Vec<TargetQueryCombination>,
    #[serde(flatten)]
    pub scoring: ScoringParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub sequences: HashMap<SequenceId, Sequence>,
    pub queries: Vec<TargetQueryCombination>,
    #[serde(flatten)]
    pub scoring: ScoringParameters,
}

impl JobRequest {
    pub fn from_multipart(request: MultipartJobRequest, sequences: HashMap<SequenceId, Sequence>) -> Self {
        Self {
            sequences,
            queries: request.queries,
            scoring: request.scoring,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JobId {
    pub id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    InQueue,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub state: JobState,
    // the progress as fraction [0-1]
    pub progress: f64,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computation_time_ms: Option<u64>,
}

/// A local alignment as reported by a worker.
///
/// `max_x` is the rightmost matched index into the query sequence,
/// `max_y` the rightmost matched index into the target sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub query_alignment: String,
    pub target_alignment: String,
    pub length: usize,
    pub score: i64,
    #[serde(rename = "maxX")]
    pub max_x: i64,
    #[serde(rename = "maxY")]
    pub max_y: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResultCombination {
    pub combination: TargetQueryCombination,
    pub alignments: Vec<Alignment>,
}

// the result returned to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub alignments: Vec<JobResultCombination>,
}

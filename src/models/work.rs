use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::job::{Alignment, ScoringParameters, Sequence, SequenceId, TargetQueryCombination};

/// Package as handed to a worker, carrying only the sequences it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkPackage {
    pub id: Uuid,
    pub job_id: Uuid,
    pub queries: Vec<TargetQueryCombination>,
    pub sequences: HashMap<SequenceId, Sequence>,
    #[serde(flatten)]
    pub scoring: ScoringParameters,
}

/// Same as [`WorkPackage`] but the worker fetches sequences one by one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWorkPackage {
    pub id: Uuid,
    pub job_id: Uuid,
    pub queries: Vec<TargetQueryCombination>,
    #[serde(flatten)]
    pub scoring: ScoringParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkStatus {
    pub percentage_done: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkResultCombination {
    pub combination: TargetQueryCombination,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkResult {
    pub alignments: Vec<WorkResultCombination>,
}

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{
    Alignment, JobRequest, JobResult, JobResultCombination, JobState, JobStatus,
    ScoringParameters, Sequence, SequenceId, TargetQueryCombination,
};

/// Bound on the absolute value of every scoring parameter
pub const MAX_SCORE_MAGNITUDE: i64 = 1_000_000;

/// A submitted alignment job and the three-way split of its combinations into
/// completed, in progress and missing.
#[derive(Debug)]
pub struct Job {
    pub id: Uuid,
    pub sequences: Arc<HashMap<SequenceId, Sequence>>,
    pub queries: IndexSet<TargetQueryCombination>,
    pub scoring: ScoringParameters,
    pub completed: HashMap<TargetQueryCombination, Vec<Alignment>>,
    pub in_progress: HashSet<TargetQueryCombination>,
    pub submitted_at: DateTime<Utc>,
    pub start_time: Instant,
    pub computation_time: Option<Duration>,
}

impl Job {
    /// Validates the request and builds a job with nothing completed yet.
    /// Duplicate combinations collapse into one, keeping submission order.
    pub fn new(id: Uuid, request: JobRequest) -> AppResult<Self> {
        if request.queries.is_empty() {
            return Err(AppError::InvalidRequest(
                "Job needs at least one target/query combination".into(),
            ));
        }
        let scoring = request.scoring;
        for value in [scoring.match_score, scoring.mismatch_penalty, scoring.gap_penalty] {
            if value.unsigned_abs() > MAX_SCORE_MAGNITUDE.unsigned_abs() {
                return Err(AppError::InvalidRequest(format!(
                    "Scoring parameters must lie within +/-{}",
                    MAX_SCORE_MAGNITUDE
                )));
            }
        }
        for combination in &request.queries {
            if !request.sequences.contains_key(&combination.target) {
                return Err(AppError::InvalidRequest(format!(
                    "Missing sequence for target {}",
                    combination.target
                )));
            }
            if !request.sequences.contains_key(&combination.query) {
                return Err(AppError::InvalidRequest(format!(
                    "Missing sequence for query {}",
                    combination.query
                )));
            }
        }

        Ok(Self {
            id,
            sequences: Arc::new(request.sequences),
            queries: request.queries.into_iter().collect(),
            scoring: request.scoring,
            completed: HashMap::new(),
            in_progress: HashSet::new(),
            submitted_at: Utc::now(),
            start_time: Instant::now(),
            computation_time: None,
        })
    }

    pub fn state(&self) -> JobState {
        if self.done() {
            JobState::Done
        } else if self.completed.is_empty() {
            JobState::InQueue
        } else {
            JobState::InProgress
        }
    }

    /// True once every requested combination has at least one accepted alignment.
    pub fn done(&self) -> bool {
        self.queries
            .iter()
            .all(|c| self.completed.get(c).is_some_and(|a| !a.is_empty()))
    }

    pub fn percentage_done(&self) -> f64 {
        if self.queries.is_empty() {
            return 1.0;
        }
        self.completed.len() as f64 / self.queries.len() as f64
    }

    /// Combinations that are neither completed nor handed out, in submission order.
    pub fn missing_sequences(&self) -> Vec<TargetQueryCombination> {
        self.queries
            .iter()
            .filter(|c| !self.completed.contains_key(*c) && !self.in_progress.contains(*c))
            .cloned()
            .collect()
    }

    pub fn has_missing_sequences(&self) -> bool {
        self.queries
            .iter()
            .any(|c| !self.completed.contains_key(c) && !self.in_progress.contains(c))
    }

    pub fn sequence(&self, id: &str) -> Option<&Sequence> {
        self.sequences.get(id)
    }

    /// Appends an accepted alignment; earlier reports for the same combination stay.
    pub fn record_alignment(&mut self, combination: TargetQueryCombination, alignment: Alignment) {
        self.in_progress.remove(&combination);
        self.completed.entry(combination).or_default().push(alignment);
    }

    /// Drops every accepted alignment, so all of them become schedulable again.
    pub fn discard_results(&mut self) -> usize {
        let discarded = self.completed.len();
        self.completed.clear();
        self.computation_time = None;
        discarded
    }

    /// Stamps the computation time the first time the job is seen done.
    pub fn mark_finished_if_done(&mut self) -> bool {
        if self.computation_time.is_none() && self.done() {
            self.computation_time = Some(self.start_time.elapsed());
            return true;
        }
        false
    }

    pub fn status(&self) -> JobStatus {
        JobStatus {
            state: self.state(),
            progress: self.percentage_done(),
            submitted_at: self.submitted_at,
            computation_time_ms: self.computation_time.map(|d| d.as_millis() as u64),
        }
    }

    pub fn result(&self) -> AppResult<JobResult> {
        if !self.done() {
            return Err(AppError::JobNotDone(self.id));
        }
        let alignments = self
            .queries
            .iter()
            .filter_map(|c| {
                self.completed.get(c).map(|alignments| JobResultCombination {
                    combination: c.clone(),
                    alignments: alignments.clone(),
                })
            })
            .collect();
        Ok(JobResult { alignments })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn job_request(queries: &[(&str, &str)]) -> JobRequest {
        let mut sequences = HashMap::new();
        for (target, query) in queries {
            sequences.insert(target.to_string(), "ACGTACGT".to_string());
            sequences.insert(query.to_string(), "ACGT".to_string());
        }
        JobRequest {
            sequences,
            queries: queries
                .iter()
                .map(|(t, q)| TargetQueryCombination::new(*t, *q))
                .collect(),
            scoring: ScoringParameters {
                match_score: 1,
                mismatch_penalty: 1,
                gap_penalty: 1,
            },
        }
    }

    pub(crate) fn alignment() -> Alignment {
        Alignment {
            query_alignment: "ACGT".into(),
            target_alignment: "ACGT".into(),
            length: 4,
            score: 4,
            max_x: 3,
            max_y: 3,
        }
    }

    #[test]
    fn test_new_job_is_queued() {
        let job = Job::new(Uuid::new_v4(), job_request(&[("t1", "q1"), ("t2", "q2")])).unwrap();
        assert_eq!(job.state(), JobState::InQueue);
        assert_eq!(job.missing_sequences().len(), 2);
        assert_eq!(job.percentage_done(), 0.0);
        assert!(job.result().is_err());
    }

    #[test]
    fn test_rejects_unknown_sequence_ids() {
        let mut request = job_request(&[("t1", "q1")]);
        request.sequences.remove("q1");
        assert!(matches!(
            Job::new(Uuid::new_v4(), request),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_rejects_empty_queries() {
        let request = job_request(&[]);
        assert!(Job::new(Uuid::new_v4(), request).is_err());
    }

    #[test]
    fn test_rejects_extreme_scoring() {
        let mut request = job_request(&[("t1", "q1")]);
        request.scoring.gap_penalty = i64::MIN;
        assert!(matches!(
            Job::new(Uuid::new_v4(), request),
            Err(AppError::InvalidRequest(_))
        ));

        let mut request = job_request(&[("t1", "q1")]);
        request.scoring.match_score = MAX_SCORE_MAGNITUDE;
        assert!(Job::new(Uuid::new_v4(), request).is_ok());
    }

    #[test]
    fn test_duplicate_combinations_collapse() {
        let request = job_request(&[("t1", "q1"), ("t1", "q1"), ("t2", "q2")]);
        let job = Job::new(Uuid::new_v4(), request).unwrap();
        assert_eq!(job.queries.len(), 2);
        assert_eq!(job.queries[0], TargetQueryCombination::new("t1", "q1"));
    }

    #[test]
    fn test_missing_excludes_completed_and_in_progress() {
        let mut job = Job::new(
            Uuid::new_v4(),
            job_request(&[("t1", "q1"), ("t2", "q2"), ("t3", "q3")]),
        )
        .unwrap();
        job.in_progress.insert(TargetQueryCombination::new("t1", "q1"));
        job.in_progress.insert(TargetQueryCombination::new("t2", "q2"));
        job.record_alignment(TargetQueryCombination::new("t2", "q2"), alignment());

        assert_eq!(job.missing_sequences(), vec![TargetQueryCombination::new("t3", "q3")]);
        assert!(!job.in_progress.contains(&TargetQueryCombination::new("t2", "q2")));
        assert_eq!(job.state(), JobState::InProgress);
    }

    #[test]
    fn test_done_when_every_combination_completed() {
        let mut job = Job::new(Uuid::new_v4(), job_request(&[("t1", "q1"), ("t2", "q2")])).unwrap();
        job.record_alignment(TargetQueryCombination::new("t1", "q1"), alignment());
        job.record_alignment(TargetQueryCombination::new("t1", "q1"), alignment());
        assert!(!job.done());

        job.record_alignment(TargetQueryCombination::new("t2", "q2"), alignment());
        assert!(job.done());
        assert_eq!(job.state(), JobState::Done);
        assert!(job.mark_finished_if_done());
        assert!(!job.mark_finished_if_done());

        let result = job.result().unwrap();
        assert_eq!(result.alignments.len(), 2);
        assert_eq!(result.alignments[0].alignments.len(), 2);
        assert!(job.status().computation_time_ms.is_some());
    }

    #[test]
    fn test_discard_results_makes_combinations_missing() {
        let mut job = Job::new(Uuid::new_v4(), job_request(&[("t1", "q1")])).unwrap();
        job.record_alignment(TargetQueryCombination::new("t1", "q1"), alignment());
        job.mark_finished_if_done();

        assert_eq!(job.discard_results(), 1);
        assert_eq!(job.state(), JobState::InQueue);
        assert_eq!(job.missing_sequences().len(), 1);
        assert!(job.computation_time.is_none());
    }
}

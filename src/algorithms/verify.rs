use std::collections::HashMap;

use crate::errors::verification::VerificationResult;
use crate::errors::{AlignmentSide, VerificationError};
use crate::models::{ScoringParameters, Sequence, SequenceId, WorkResultCombination};

const GAP: u8 = b'-';

/// Checks that a reported alignment belongs to the package's sequences and
/// that its declared score is what the job's scoring produces.
///
/// # Arguments
///
/// * `sequences` - The sequences shipped with the work package.
/// * `scoring` - Scoring parameters copied into the work package.
/// * `result` - One (combination, alignment) pair reported by a worker.
///
/// # Returns
///
/// `Ok(())` only if both aligned strings are anchored in their original
/// sequences and the score recomputes to the declared value.
pub fn verify_result(
    sequences: &HashMap<SequenceId, Sequence>,
    scoring: &ScoringParameters,
    result: &WorkResultCombination,
) -> VerificationResult {
    let alignment = &result.alignment;
    let query = lookup(sequences, &result.combination.query)?;
    let target = lookup(sequences, &result.combination.target)?;

    verify_exists(
        query.as_bytes(),
        alignment.query_alignment.as_bytes(),
        alignment.max_x,
        AlignmentSide::Query,
    )?;
    verify_exists(
        target.as_bytes(),
        alignment.target_alignment.as_bytes(),
        alignment.max_y,
        AlignmentSide::Target,
    )?;
    verify_score(
        alignment.query_alignment.as_bytes(),
        alignment.target_alignment.as_bytes(),
        alignment.length,
        alignment.score,
        scoring,
    )
}

fn lookup<'a>(
    sequences: &'a HashMap<SequenceId, Sequence>,
    id: &SequenceId,
) -> Result<&'a Sequence, VerificationError> {
    sequences
        .get(id)
        .ok_or_else(|| VerificationError::UnknownSequence(id.clone()))
}

/// Walks the aligned string backwards; every non-gap character must equal the
/// original character at the current end index, which then moves one left.
pub fn verify_exists(
    total_sequence: &[u8],
    aligned_sequence: &[u8],
    end_index: i64,
    side: AlignmentSide,
) -> VerificationResult {
    let not_anchored = VerificationError::NotAnchored { side, end_index };
    let mut index = end_index;

    for &c in aligned_sequence.iter().rev() {
        if c == GAP {
            continue;
        }
        let original = usize::try_from(index)
            .ok()
            .and_then(|i| total_sequence.get(i))
            .ok_or_else(|| not_anchored.clone())?;
        if *original != c {
            return Err(not_anchored);
        }
        index -= 1;
    }
    Ok(())
}

/// Recomputes the alignment score position by position.
pub fn verify_score(
    query_align: &[u8],
    target_align: &[u8],
    length: usize,
    expected: i64,
    scoring: &ScoringParameters,
) -> VerificationResult {
    if query_align.len() != target_align.len() || query_align.len() != length {
        return Err(VerificationError::LengthMismatch {
            query: query_align.len(),
            target: target_align.len(),
            declared: length,
        });
    }

    let actual = query_align
        .iter()
        .zip(target_align)
        .map(|(&q, &t)| {
            if q == GAP || t == GAP {
                scoring.gap_penalty.saturating_neg()
            } else if q == t {
                scoring.match_score
            } else {
                scoring.mismatch_penalty.saturating_neg()
            }
        })
        .fold(0i64, i64::saturating_add);

    if actual != expected {
        return Err(VerificationError::ScoreMismatch { expected, actual });
    }
    Ok(())
}

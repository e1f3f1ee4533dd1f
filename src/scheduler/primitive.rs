use crate::models::TargetQueryCombination;

/// Hands the whole remaining backlog of the oldest job to whoever asks first.
#[derive(Debug, Default, Clone)]
pub struct PrimitiveScheduler;

impl PrimitiveScheduler {
    pub fn select(&self, missing: Vec<TargetQueryCombination>) -> Vec<TargetQueryCombination> {
        missing
    }
}

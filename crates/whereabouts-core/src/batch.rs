//! Batch orchestration: concurrent per-target fan-out with ordered
//! reassembly.
//!
//! Workers for independent targets (items or locations) run concurrently;
//! their outcomes are joined back in input order regardless of completion
//! order, then partitioned into three buckets: resolved, unresolved with
//! similar candidates, and not found. An empty target list fails before
//! any work starts.

use std::future::Future;

use futures_util::future;

use whereabouts_types::error::MemoryError;

/// How a batch reacts to a failing worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// First error aborts the whole batch; sibling results are discarded.
    #[default]
    FailFast,
    /// Failed targets are dropped and the rest aggregate. The batch still
    /// errors if every worker failed.
    CollectErrors,
}

/// Aggregation bucket for one target's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeBucket {
    /// The target resolved exactly (found or deleted something).
    Resolved,
    /// Nothing exact, but similarity fallback produced candidates.
    SimilarFound,
    /// Nothing exact and no candidates.
    NotFound,
}

/// Per-target result produced by a batch worker.
#[derive(Debug, Clone, Default)]
pub struct TargetOutcome {
    /// The item or location as the user typed it.
    pub target: String,
    /// Exactly resolved values: locations for item lookups, item names for
    /// location lookups.
    pub exact: Vec<String>,
    /// Fallback candidates when nothing resolved exactly.
    pub similar: Vec<String>,
    /// Ids removed as a side effect (deletion workers only).
    pub deleted: Vec<String>,
}

impl TargetOutcome {
    pub fn bucket(&self) -> OutcomeBucket {
        if !self.exact.is_empty() || !self.deleted.is_empty() {
            OutcomeBucket::Resolved
        } else if !self.similar.is_empty() {
            OutcomeBucket::SimilarFound
        } else {
            OutcomeBucket::NotFound
        }
    }
}

/// Outcomes for a whole batch, in input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub outcomes: Vec<TargetOutcome>,
}

impl BatchOutcome {
    /// True iff at least one target resolved.
    pub fn any_resolved(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.bucket() == OutcomeBucket::Resolved)
    }

    /// Union of side-effect ids across the batch, in input order.
    pub fn deleted_ids(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .flat_map(|o| o.deleted.iter().cloned())
            .collect()
    }
}

/// Run one worker per target concurrently and reassemble in input order.
///
/// The worker receives the target's input index and value; the join is
/// keyed by that index, so completion order never affects aggregation.
pub async fn run<F, Fut>(
    targets: &[String],
    policy: BatchPolicy,
    worker: F,
) -> Result<BatchOutcome, MemoryError>
where
    F: Fn(usize, String) -> Fut,
    Fut: Future<Output = Result<TargetOutcome, MemoryError>>,
{
    if targets.is_empty() {
        return Err(MemoryError::Validation(
            "Sorry, not able to understand the query, please try again.".to_string(),
        ));
    }

    let futures: Vec<_> = targets
        .iter()
        .enumerate()
        .map(|(index, target)| worker(index, target.clone()))
        .collect();

    let outcomes = match policy {
        BatchPolicy::FailFast => future::try_join_all(futures).await?,
        BatchPolicy::CollectErrors => {
            let results = future::join_all(futures).await;
            let mut outcomes = Vec::with_capacity(results.len());
            let mut first_error = None;
            for result in results {
                match result {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(err) => {
                        if first_error.is_none() {
                            first_error = Some(err);
                        }
                    }
                }
            }
            if outcomes.is_empty() {
                // Every worker failed; surface the first error.
                return Err(first_error.expect("non-empty batch with no outcomes"));
            }
            outcomes
        }
    };

    Ok(BatchOutcome { outcomes })
}

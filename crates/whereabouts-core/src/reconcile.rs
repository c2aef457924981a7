//! Reconciliation of new facts against what is already stored.
//!
//! Per `(owner, item)` the store is a two-state machine: no fact, or one
//! active fact at some location. A candidate fact either creates, is a
//! duplicate (same location), or supersedes (different location).
//!
//! Writes for a whole save batch are deferred into a [`ReconcilePlan`] and
//! applied as one bulk delete + one bulk upsert only after every sentence
//! classified cleanly, so a failure anywhere aborts the save before any
//! write happens.

use whereabouts_types::error::MemoryError;
use whereabouts_types::fact::{FactRecord, ScoredFact};
use whereabouts_types::query::SavedItem;

use crate::memory::BoxFactIndex;
use crate::text::normalize;

/// Outcome of reconciling one candidate fact against the current record
/// for its item.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// No active fact for this item; create one.
    Create,
    /// Same item already stored at the same location. Not an insert; the
    /// caller reports the existing fact back to the user.
    Duplicate { existing_text: String },
    /// Same item stored elsewhere; the old fact is scheduled for deletion.
    Supersede { previous_id: String },
}

/// Decide the transition for a candidate `(item, location)` given the
/// current record for that item (the top exact-filtered hit, if any).
pub fn reconcile(existing: Option<&ScoredFact>, new_location: &str) -> Reconciliation {
    match existing {
        None => Reconciliation::Create,
        Some(fact) if fact.attributes.location == normalize(new_location) => {
            Reconciliation::Duplicate {
                existing_text: fact.attributes.original_text.clone(),
            }
        }
        Some(fact) => Reconciliation::Supersede {
            previous_id: fact.id.clone(),
        },
    }
}

/// Result of processing one sentence, merged into the batch plan.
#[derive(Debug)]
pub struct SentenceOutcome {
    pub decision: Reconciliation,
    /// The record to store for Create/Supersede; None for Duplicate.
    pub record: Option<FactRecord>,
}

/// Deferred writes for one save batch.
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    /// Ids superseded by this batch, deleted in one bulk call.
    pub deletes: Vec<String>,
    /// New records, upserted in one bulk call after the deletes.
    pub upserts: Vec<FactRecord>,
    /// Per-record summaries for the save response, in input order.
    pub stored: Vec<SavedItem>,
    /// Original texts of facts that already existed unchanged. A non-empty
    /// list aborts the batch before any write.
    pub duplicates: Vec<String>,
}

impl ReconcilePlan {
    /// Fold one sentence's outcome into the plan.
    pub fn merge(&mut self, outcome: SentenceOutcome) {
        match outcome.decision {
            Reconciliation::Duplicate { existing_text } => {
                self.duplicates.push(existing_text);
            }
            Reconciliation::Supersede { previous_id } => {
                self.deletes.push(previous_id);
                self.push_record(outcome.record);
            }
            Reconciliation::Create => {
                self.push_record(outcome.record);
            }
        }
    }

    fn push_record(&mut self, record: Option<FactRecord>) {
        if let Some(record) = record {
            self.stored.push(SavedItem {
                vector_id: record.id.clone(),
                location: record.attributes.location.clone(),
                item: record.attributes.item.clone(),
            });
            self.upserts.push(record);
        }
    }

    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Apply the plan: bulk delete superseded ids, then bulk upsert new
    /// records. Must not be called when [`Self::has_duplicates`] is true.
    #[tracing::instrument(skip(self, index), fields(deletes = self.deletes.len(), upserts = self.upserts.len()))]
    pub async fn apply(&self, index: &BoxFactIndex) -> Result<(), MemoryError> {
        if !self.deletes.is_empty() {
            index.delete(&self.deletes).await?;
        }
        if !self.upserts.is_empty() {
            index.upsert(&self.upserts).await?;
        }
        Ok(())
    }
}

//! Similarity matcher: exact-filtered lookups and fallback suggestions.
//!
//! Two query modes against the vector index, both driven by the embedding
//! of a synthetic question built from the target item or location:
//!
//! - **Exact-filtered**: the filter pins owner plus the normalized item or
//!   location attribute. Any match means the target exists; no score
//!   threshold applies.
//! - **Fallback**: owner-only filter, ranked by descending score. Matches
//!   scoring below the caller's minimum are discarded (the boundary value
//!   itself is kept); survivors are deduplicated by attribute value and
//!   offered as suggestions, never as authoritative results.

use std::collections::HashSet;
use std::sync::Arc;

use whereabouts_types::error::MemoryError;
use whereabouts_types::fact::{FactFilter, ScoredFact};

use crate::memory::{BoxEmbedder, BoxFactIndex};
use crate::text::normalize;

/// Minimum fallback score when suggesting items for a retrieval query.
pub const ITEM_RETRIEVAL_MIN_SCORE: f32 = 0.65;
/// Minimum fallback score when suggesting items for a deletion query.
pub const ITEM_DELETION_MIN_SCORE: f32 = 0.65;
/// Minimum fallback score when suggesting locations for a retrieval query.
pub const LOCATION_RETRIEVAL_MIN_SCORE: f32 = 0.70;
/// Minimum fallback score when suggesting locations for a deletion query.
pub const LOCATION_DELETION_MIN_SCORE: f32 = 0.75;

/// Exact item lookups only need the current fact plus a little slack.
pub const ITEM_LOOKUP_TOP_K: usize = 3;
/// A location can hold many facts; fetch them all.
pub const LOCATION_LOOKUP_TOP_K: usize = 100;
/// Fallback suggestion breadth.
pub const FALLBACK_TOP_K: usize = 3;

/// Keep matches scoring at or above `min_score`.
pub fn valid_matches(matches: Vec<ScoredFact>, min_score: f32) -> Vec<ScoredFact> {
    matches
        .into_iter()
        .filter(|m| m.score >= min_score)
        .collect()
}

/// Order matches by descending score.
pub fn sort_by_score(mut matches: Vec<ScoredFact>) -> Vec<ScoredFact> {
    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    matches
}

/// Deduplicate by an attribute projection, keeping first (highest-ranked)
/// occurrences in order.
fn dedup_by_value<F>(matches: &[ScoredFact], project: F) -> Vec<String>
where
    F: Fn(&ScoredFact) -> &str,
{
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for m in matches {
        let value = project(m).to_string();
        if seen.insert(value.clone()) {
            values.push(value);
        }
    }
    values
}

/// Wraps the embedder and index behind the two query modes.
pub struct SimilarityMatcher {
    embedder: Arc<BoxEmbedder>,
    index: Arc<BoxFactIndex>,
}

impl SimilarityMatcher {
    pub fn new(embedder: Arc<BoxEmbedder>, index: Arc<BoxFactIndex>) -> Self {
        Self { embedder, index }
    }

    /// Embed a single synthetic question.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        let mut vectors = self.embedder.embed(&[text.to_string()]).await?;
        if vectors.is_empty() {
            return Err(MemoryError::Embedding(
                "embedder returned no vector".to_string(),
            ));
        }
        Ok(vectors.remove(0))
    }

    /// Exact-filtered lookup by item. "Found" = at least one match.
    pub async fn exact_by_item(
        &self,
        owner_id: i64,
        item: &str,
        vector: &[f32],
    ) -> Result<Vec<ScoredFact>, MemoryError> {
        let filter = FactFilter::item(owner_id, normalize(item));
        self.index.query(vector, ITEM_LOOKUP_TOP_K, &filter).await
    }

    /// Exact-filtered lookup by location, wide enough to return every fact
    /// stored there.
    pub async fn exact_by_location(
        &self,
        owner_id: i64,
        location: &str,
        vector: &[f32],
    ) -> Result<Vec<ScoredFact>, MemoryError> {
        let filter = FactFilter::location(owner_id, normalize(location));
        self.index
            .query(vector, LOCATION_LOOKUP_TOP_K, &filter)
            .await
    }

    /// The current active fact for an item, if any: the top hit of an
    /// exact-filtered item query. No score threshold -- any hit for the
    /// filtered item is the record for that item.
    pub async fn current_fact_for_item(
        &self,
        owner_id: i64,
        item: &str,
        vector: &[f32],
    ) -> Result<Option<ScoredFact>, MemoryError> {
        let mut matches = self.exact_by_item(owner_id, item, vector).await?;
        if matches.is_empty() {
            Ok(None)
        } else {
            Ok(Some(matches.remove(0)))
        }
    }

    /// Fallback suggestions: similar item names at or above `min_score`.
    pub async fn similar_items(
        &self,
        owner_id: i64,
        vector: &[f32],
        min_score: f32,
    ) -> Result<Vec<String>, MemoryError> {
        let matches = self
            .index
            .query(vector, FALLBACK_TOP_K, &FactFilter::owner(owner_id))
            .await?;
        let matches = sort_by_score(valid_matches(matches, min_score));
        Ok(dedup_by_value(&matches, |m| m.attributes.item.as_str()))
    }

    /// Fallback suggestions: similar location names at or above `min_score`.
    pub async fn similar_locations(
        &self,
        owner_id: i64,
        vector: &[f32],
        min_score: f32,
    ) -> Result<Vec<String>, MemoryError> {
        let matches = self
            .index
            .query(vector, FALLBACK_TOP_K, &FactFilter::owner(owner_id))
            .await?;
        let matches = sort_by_score(valid_matches(matches, min_score));
        Ok(dedup_by_value(&matches, |m| m.attributes.location.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use whereabouts_types::fact::FactAttributes;

    fn scored(id: &str, score: f32, item: &str, location: &str) -> ScoredFact {
        ScoredFact {
            id: id.to_string(),
            score,
            attributes: FactAttributes {
                owner_id: 1,
                item: item.to_string(),
                location: location.to_string(),
                original_text: format!("I have kept {item} in the {location}."),
                created_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let matches = vec![
            scored("a", 0.65, "keys", "drawer"),
            scored("b", 0.649_999_9, "wallet", "desk"),
            scored("c", 0.9, "charger", "shelf"),
        ];
        let kept = valid_matches(matches, 0.65);
        let ids: Vec<_> = kept.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_sort_by_score_descending() {
        let matches = vec![
            scored("low", 0.2, "a", "x"),
            scored("high", 0.9, "b", "y"),
            scored("mid", 0.5, "c", "z"),
        ];
        let sorted = sort_by_score(matches);
        let ids: Vec<_> = sorted.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let matches = vec![
            scored("a", 0.9, "keys", "drawer"),
            scored("b", 0.8, "keys", "shelf"),
            scored("c", 0.7, "wallet", "desk"),
        ];
        let items = dedup_by_value(&matches, |m| m.attributes.item.as_str());
        assert_eq!(items, vec!["keys".to_string(), "wallet".to_string()]);
    }
}

//! In-process fact index with cosine similarity.
//!
//! Backs tests and local runs where a remote index is unavailable. Data
//! lives in a `DashMap` and is lost on restart; filter semantics match the
//! remote backend (owner scoping plus optional exact item/location
//! attributes).

use dashmap::DashMap;

use whereabouts_core::memory::FactIndex;
use whereabouts_types::error::MemoryError;
use whereabouts_types::fact::{FactFilter, FactRecord, ScoredFact};

/// Cosine similarity between two vectors; zero vectors score 0.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn matches_filter(record: &FactRecord, filter: &FactFilter) -> bool {
    record.attributes.owner_id == filter.owner_id
        && filter
            .item
            .as_ref()
            .is_none_or(|item| &record.attributes.item == item)
        && filter
            .location
            .as_ref()
            .is_none_or(|location| &record.attributes.location == location)
}

/// Dashmap-backed fact index.
#[derive(Default)]
pub struct MemoryFactIndex {
    records: DashMap<String, FactRecord>,
}

impl MemoryFactIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records (all owners).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FactIndex for MemoryFactIndex {
    async fn upsert(&self, records: &[FactRecord]) -> Result<(), MemoryError> {
        for record in records {
            self.records.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<FactRecord>, MemoryError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.records.get(id).map(|r| r.clone()))
            .collect())
    }

    async fn delete(&self, ids: &[String]) -> Result<(), MemoryError> {
        for id in ids {
            self.records.remove(id);
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &FactFilter,
    ) -> Result<Vec<ScoredFact>, MemoryError> {
        let mut matches: Vec<ScoredFact> = self
            .records
            .iter()
            .filter(|entry| matches_filter(entry.value(), filter))
            .map(|entry| ScoredFact {
                id: entry.id.clone(),
                score: cosine_similarity(vector, &entry.values),
                attributes: entry.attributes.clone(),
            })
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_k);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use whereabouts_types::fact::FactAttributes;

    fn record(id: &str, owner_id: i64, item: &str, location: &str, values: Vec<f32>) -> FactRecord {
        FactRecord {
            id: id.to_string(),
            values,
            attributes: FactAttributes {
                owner_id,
                item: item.to_string(),
                location: location.to_string(),
                original_text: format!("I have kept {item} in the {location}."),
                created_at: Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let index = MemoryFactIndex::new();
        index
            .upsert(&[record("a", 1, "keys", "drawer", vec![1.0, 0.0])])
            .await
            .unwrap();
        index
            .upsert(&[record("a", 1, "keys", "shelf", vec![1.0, 0.0])])
            .await
            .unwrap();

        assert_eq!(index.len(), 1);
        let fetched = index.fetch(&["a".to_string()]).await.unwrap();
        assert_eq!(fetched[0].attributes.location, "shelf");
    }

    #[tokio::test]
    async fn test_fetch_skips_unknown_ids() {
        let index = MemoryFactIndex::new();
        index
            .upsert(&[record("a", 1, "keys", "drawer", vec![1.0, 0.0])])
            .await
            .unwrap();

        let fetched = index
            .fetch(&["a".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(fetched.len(), 1);
    }

    #[tokio::test]
    async fn test_query_scopes_to_owner() {
        let index = MemoryFactIndex::new();
        index
            .upsert(&[
                record("a", 1, "keys", "drawer", vec![1.0, 0.0]),
                record("b", 2, "keys", "drawer", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let matches = index
            .query(&[1.0, 0.0], 10, &FactFilter::owner(1))
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "a");
    }

    #[tokio::test]
    async fn test_query_exact_attribute_filters() {
        let index = MemoryFactIndex::new();
        index
            .upsert(&[
                record("a", 1, "keys", "drawer", vec![1.0, 0.0]),
                record("b", 1, "wallet", "drawer", vec![1.0, 0.0]),
                record("c", 1, "keys", "shelf", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let by_item = index
            .query(&[1.0, 0.0], 10, &FactFilter::item(1, "keys"))
            .await
            .unwrap();
        let ids: Vec<&str> = by_item.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"a") && ids.contains(&"c"));

        let by_location = index
            .query(&[1.0, 0.0], 10, &FactFilter::location(1, "drawer"))
            .await
            .unwrap();
        assert_eq!(by_location.len(), 2);
    }

    #[tokio::test]
    async fn test_query_ranks_by_cosine_and_truncates() {
        let index = MemoryFactIndex::new();
        index
            .upsert(&[
                record("far", 1, "a", "x", vec![0.0, 1.0]),
                record("near", 1, "b", "y", vec![1.0, 0.0]),
                record("mid", 1, "c", "z", vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let matches = index
            .query(&[1.0, 0.0], 2, &FactFilter::owner(1))
            .await
            .unwrap();
        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
        assert!(matches[0].score > matches[1].score);
    }

    #[test]
    fn test_cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}

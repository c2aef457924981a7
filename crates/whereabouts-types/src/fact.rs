//! Memory fact types for Whereabouts.
//!
//! A fact is one stored item-location relationship with its provenance
//! sentence. Facts live in the vector index as records (id + embedding +
//! attributes); `MemoryFact` is the domain-level view of one record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single item-location fact extracted from a user statement.
///
/// Facts are owner-scoped. At most one active fact exists per
/// `(owner_id, item)`; saving the same item at a new location supersedes
/// the previous fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryFact {
    pub id: Uuid,
    /// Owning user; every query and mutation is scoped to it.
    pub owner_id: i64,
    /// Normalized (lowercased, trimmed) item name.
    pub item: String,
    /// Normalized location name.
    pub location: String,
    /// The canonical sentence the fact was extracted from. Retained for
    /// rename rewriting and response composition.
    pub original_text: String,
    pub created_at: DateTime<Utc>,
}

impl MemoryFact {
    /// Create a new fact with a fresh UUIDv7 id and the current timestamp.
    pub fn new(owner_id: i64, item: String, location: String, original_text: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            owner_id,
            item,
            location,
            original_text,
            created_at: Utc::now(),
        }
    }

    /// Pair this fact with its embedding to form an index record.
    pub fn into_record(self, values: Vec<f32>) -> FactRecord {
        FactRecord {
            id: self.id.to_string(),
            values,
            attributes: FactAttributes {
                owner_id: self.owner_id,
                item: self.item,
                location: self.location,
                original_text: self.original_text,
                created_at: self.created_at,
            },
        }
    }
}

/// Attributes stored alongside each vector in the index.
///
/// Field names mirror the wire-level attribute keys used for filtered
/// queries (`userId`, `item`, `location`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactAttributes {
    #[serde(rename = "userId")]
    pub owner_id: i64,
    pub item: String,
    pub location: String,
    #[serde(rename = "originalText")]
    pub original_text: String,
    #[serde(rename = "datetime")]
    pub created_at: DateTime<Utc>,
}

/// A full index record: id, embedding vector, and attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub attributes: FactAttributes,
}

/// A query match returned by the index, ranked by similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredFact {
    pub id: String,
    pub score: f32,
    pub attributes: FactAttributes,
}

/// Attribute filter for index queries.
///
/// `owner_id` is always present; all index access is partitioned by owner.
/// `item`/`location` restrict to exact normalized attribute values; leaving
/// both empty yields an owner-wide similarity query.
#[derive(Debug, Clone, PartialEq)]
pub struct FactFilter {
    pub owner_id: i64,
    pub item: Option<String>,
    pub location: Option<String>,
}

impl FactFilter {
    /// Owner-wide filter (fallback similarity queries).
    pub fn owner(owner_id: i64) -> Self {
        Self {
            owner_id,
            item: None,
            location: None,
        }
    }

    /// Exact-item filter.
    pub fn item(owner_id: i64, item: impl Into<String>) -> Self {
        Self {
            owner_id,
            item: Some(item.into()),
            location: None,
        }
    }

    /// Exact-location filter.
    pub fn location(owner_id: i64, location: impl Into<String>) -> Self {
        Self {
            owner_id,
            item: None,
            location: Some(location.into()),
        }
    }
}

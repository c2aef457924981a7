//! Vector index trait for fact storage and similarity search.
//!
//! The index is the only persistent store in the system. All access is
//! scoped by owner through [`FactFilter`]; an empty query result is a
//! legitimate miss, never an error.

use whereabouts_types::error::MemoryError;
use whereabouts_types::fact::{FactFilter, FactRecord, ScoredFact};

/// Trait for the filtered similarity index holding fact records.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in whereabouts-infra. Assumed eventually
/// consistent within one logical session; no cross-record transactions.
pub trait FactIndex: Send + Sync {
    /// Insert or replace records by id.
    fn upsert(
        &self,
        records: &[FactRecord],
    ) -> impl std::future::Future<Output = Result<(), MemoryError>> + Send;

    /// Fetch records by id. Unknown ids are skipped, not errors.
    fn fetch(
        &self,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<FactRecord>, MemoryError>> + Send;

    /// Delete records by id.
    fn delete(
        &self,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<(), MemoryError>> + Send;

    /// Similarity-query the index, restricted by `filter`, returning up to
    /// `top_k` matches ranked by descending score.
    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &FactFilter,
    ) -> impl std::future::Future<Output = Result<Vec<ScoredFact>, MemoryError>> + Send;
}

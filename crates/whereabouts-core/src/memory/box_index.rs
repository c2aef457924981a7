//! BoxFactIndex -- object-safe dynamic dispatch wrapper for FactIndex.
//!
//! Blanket-impl pattern:
//! 1. Define an object-safe `FactIndexDyn` trait with boxed futures
//! 2. Blanket-impl `FactIndexDyn` for all `T: FactIndex`
//! 3. `BoxFactIndex` wraps `Box<dyn FactIndexDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use whereabouts_types::error::MemoryError;
use whereabouts_types::fact::{FactFilter, FactRecord, ScoredFact};

use super::index::FactIndex;

/// Object-safe version of [`FactIndex`] with boxed futures.
pub trait FactIndexDyn: Send + Sync {
    fn upsert_boxed<'a>(
        &'a self,
        records: &'a [FactRecord],
    ) -> Pin<Box<dyn Future<Output = Result<(), MemoryError>> + Send + 'a>>;

    fn fetch_boxed<'a>(
        &'a self,
        ids: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<FactRecord>, MemoryError>> + Send + 'a>>;

    fn delete_boxed<'a>(
        &'a self,
        ids: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<(), MemoryError>> + Send + 'a>>;

    fn query_boxed<'a>(
        &'a self,
        vector: &'a [f32],
        top_k: usize,
        filter: &'a FactFilter,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ScoredFact>, MemoryError>> + Send + 'a>>;
}

/// Blanket implementation: any `FactIndex` automatically implements `FactIndexDyn`.
impl<T: FactIndex> FactIndexDyn for T {
    fn upsert_boxed<'a>(
        &'a self,
        records: &'a [FactRecord],
    ) -> Pin<Box<dyn Future<Output = Result<(), MemoryError>> + Send + 'a>> {
        Box::pin(self.upsert(records))
    }

    fn fetch_boxed<'a>(
        &'a self,
        ids: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<FactRecord>, MemoryError>> + Send + 'a>> {
        Box::pin(self.fetch(ids))
    }

    fn delete_boxed<'a>(
        &'a self,
        ids: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<(), MemoryError>> + Send + 'a>> {
        Box::pin(self.delete(ids))
    }

    fn query_boxed<'a>(
        &'a self,
        vector: &'a [f32],
        top_k: usize,
        filter: &'a FactFilter,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ScoredFact>, MemoryError>> + Send + 'a>> {
        Box::pin(self.query(vector, top_k, filter))
    }
}

/// Type-erased fact index for runtime backend selection (remote index or
/// in-process).
///
/// Since `FactIndex` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxFactIndex` provides equivalent methods that delegate to
/// the inner `FactIndexDyn` trait object.
pub struct BoxFactIndex {
    inner: Box<dyn FactIndexDyn + Send + Sync>,
}

impl BoxFactIndex {
    /// Wrap a concrete `FactIndex` in a type-erased box.
    pub fn new<T: FactIndex + 'static>(index: T) -> Self {
        Self {
            inner: Box::new(index),
        }
    }

    /// Insert or replace records by id.
    pub async fn upsert(&self, records: &[FactRecord]) -> Result<(), MemoryError> {
        self.inner.upsert_boxed(records).await
    }

    /// Fetch records by id. Unknown ids are skipped, not errors.
    pub async fn fetch(&self, ids: &[String]) -> Result<Vec<FactRecord>, MemoryError> {
        self.inner.fetch_boxed(ids).await
    }

    /// Delete records by id.
    pub async fn delete(&self, ids: &[String]) -> Result<(), MemoryError> {
        self.inner.delete_boxed(ids).await
    }

    /// Similarity-query the index, restricted by `filter`.
    pub async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &FactFilter,
    ) -> Result<Vec<ScoredFact>, MemoryError> {
        self.inner.query_boxed(vector, top_k, filter).await
    }
}

//! MemoryService: the four public memory operations.
//!
//! Wires the classifier, segmenter, extractor, reconciliation engine,
//! similarity matcher, and batch orchestrator over the collaborator ports.
//! Operation implementations are split per file: `save`, `retrieve`,
//! `remove`, `rename`.

mod remove;
mod rename;
mod retrieve;
mod save;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde_json::Value;

use whereabouts_types::error::MemoryError;
use whereabouts_types::fact::FactRecord;

use crate::batch::BatchPolicy;
use crate::inference::BoxInference;
use crate::matcher::SimilarityMatcher;
use crate::memory::{BoxEmbedder, BoxFactIndex};
use crate::prompt::PromptTemplate;

/// Model names used per call site: prompt-driven generation and save-side
/// classification run on one model, retrieval classification on another.
#[derive(Debug, Clone)]
pub struct ServiceModels {
    pub generation: String,
    pub retrieval: String,
}

/// The memory service. One instance serves all owners; every operation is
/// scoped by the caller-supplied owner id.
///
/// Concurrent saves by the same owner for the same item are
/// last-writer-wins; there is no concurrency token.
pub struct MemoryService {
    inference: BoxInference,
    embedder: Arc<BoxEmbedder>,
    index: Arc<BoxFactIndex>,
    matcher: SimilarityMatcher,
    models: ServiceModels,
    policy: BatchPolicy,
}

impl MemoryService {
    pub fn new(
        inference: BoxInference,
        embedder: BoxEmbedder,
        index: BoxFactIndex,
        models: ServiceModels,
    ) -> Self {
        let embedder = Arc::new(embedder);
        let index = Arc::new(index);
        let matcher = SimilarityMatcher::new(Arc::clone(&embedder), Arc::clone(&index));
        Self {
            inference,
            embedder,
            index,
            matcher,
            models,
            policy: BatchPolicy::default(),
        }
    }

    /// Override the batch failure policy (fail-fast by default).
    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch records by id and keep only those belonging to `owner_id`.
    /// Foreign ids are dropped silently, not errors.
    pub(crate) async fn owned_records(
        &self,
        owner_id: i64,
        ids: &[String],
    ) -> Result<Vec<FactRecord>, MemoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let records = self.index.fetch(ids).await?;
        Ok(records
            .into_iter()
            .filter(|r| r.attributes.owner_id == owner_id)
            .collect())
    }

    /// Run a composition prompt and return its `answer` field.
    ///
    /// Composition of the final answer is load-bearing; a missing field is
    /// a collaborator failure, not something to paper over.
    pub(crate) async fn compose_answer(
        &self,
        template: &PromptTemplate,
        vars: &Value,
    ) -> Result<String, MemoryError> {
        let result = self
            .inference
            .infer(&self.models.generation, template, vars)
            .await?;
        result
            .get("answer")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                MemoryError::Inference(format!("{} returned no answer", template.name))
            })
    }
}

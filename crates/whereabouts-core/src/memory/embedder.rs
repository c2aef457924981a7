//! Embedder trait for text-to-vector conversion.
//!
//! Defines the interface for embedding statements and synthetic lookup
//! questions. Implementations (e.g., the Gemini embedding API) live in
//! whereabouts-infra.

use whereabouts_types::error::MemoryError;

/// Trait for converting text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait Embedder: Send + Sync {
    /// Embed one or more texts into vectors, one per input, in input order.
    ///
    /// Batch embedding is used for multi-sentence saves so a whole
    /// statement costs one call.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, MemoryError>> + Send;

    /// The model name used for embeddings.
    fn model_name(&self) -> &str;

    /// The dimensionality of the output vectors; must match the index's
    /// configured dimension.
    fn dimension(&self) -> usize;
}

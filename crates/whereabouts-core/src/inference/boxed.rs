//! BoxInference -- object-safe dynamic dispatch wrapper for Inference.
//!
//! Same blanket-impl pattern as the embedder and index wrappers:
//! 1. Define an object-safe `InferenceDyn` trait with boxed futures
//! 2. Blanket-impl `InferenceDyn` for all `T: Inference`
//! 3. `BoxInference` wraps `Box<dyn InferenceDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use whereabouts_types::error::MemoryError;

use super::{CapabilityDecl, Inference, IntentCall};
use crate::prompt::PromptTemplate;

/// Object-safe version of [`Inference`] with boxed futures.
pub trait InferenceDyn: Send + Sync {
    fn infer_boxed<'a>(
        &'a self,
        model: &'a str,
        prompt: &'a PromptTemplate,
        vars: &'a Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, MemoryError>> + Send + 'a>>;

    fn classify_boxed<'a>(
        &'a self,
        model: &'a str,
        utterance: &'a str,
        capabilities: &'a [CapabilityDecl],
    ) -> Pin<Box<dyn Future<Output = Result<Option<IntentCall>, MemoryError>> + Send + 'a>>;
}

/// Blanket implementation: any `Inference` automatically implements
/// `InferenceDyn`.
impl<T: Inference> InferenceDyn for T {
    fn infer_boxed<'a>(
        &'a self,
        model: &'a str,
        prompt: &'a PromptTemplate,
        vars: &'a Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, MemoryError>> + Send + 'a>> {
        Box::pin(self.infer(model, prompt, vars))
    }

    fn classify_boxed<'a>(
        &'a self,
        model: &'a str,
        utterance: &'a str,
        capabilities: &'a [CapabilityDecl],
    ) -> Pin<Box<dyn Future<Output = Result<Option<IntentCall>, MemoryError>> + Send + 'a>> {
        Box::pin(self.classify(model, utterance, capabilities))
    }
}

/// Type-erased language understanding collaborator.
///
/// Since `Inference` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxInference` provides equivalent methods that delegate to
/// the inner `InferenceDyn` trait object, enabling runtime selection of
/// model backends.
pub struct BoxInference {
    inner: Box<dyn InferenceDyn + Send + Sync>,
}

impl BoxInference {
    /// Wrap a concrete `Inference` in a type-erased box.
    pub fn new<T: Inference + 'static>(inference: T) -> Self {
        Self {
            inner: Box::new(inference),
        }
    }

    /// Run a prompt template with variables and return its parsed JSON result.
    pub async fn infer(
        &self,
        model: &str,
        prompt: &PromptTemplate,
        vars: &Value,
    ) -> Result<Value, MemoryError> {
        self.inner.infer_boxed(model, prompt, vars).await
    }

    /// Classify an utterance against capability declarations.
    pub async fn classify(
        &self,
        model: &str,
        utterance: &str,
        capabilities: &[CapabilityDecl],
    ) -> Result<Option<IntentCall>, MemoryError> {
        self.inner
            .classify_boxed(model, utterance, capabilities)
            .await
    }
}

//! Language understanding port.
//!
//! One collaborator covers both structured prompt inference (JSON in, JSON
//! out) and operation classification against declared capabilities.
//! Implementations (e.g., Gemini) live in whereabouts-infra.

pub mod boxed;

pub use boxed::BoxInference;

use serde_json::Value;

use whereabouts_types::error::MemoryError;

use crate::prompt::PromptTemplate;

/// Declares one operation the classifier may select: a name, a
/// natural-language purpose, and a JSON schema for its parameters.
#[derive(Debug, Clone)]
pub struct CapabilityDecl {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// The classifier's selection: an operation name plus raw arguments.
///
/// Arguments are passed through verbatim; validation into a typed intent
/// happens in [`crate::intent`].
#[derive(Debug, Clone, PartialEq)]
pub struct IntentCall {
    pub name: String,
    pub args: Value,
}

/// Trait for structured language understanding.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in whereabouts-infra.
pub trait Inference: Send + Sync {
    /// Run a prompt template with variables and return its parsed JSON
    /// result.
    fn infer(
        &self,
        model: &str,
        prompt: &PromptTemplate,
        vars: &Value,
    ) -> impl std::future::Future<Output = Result<Value, MemoryError>> + Send;

    /// Classify an utterance against capability declarations.
    ///
    /// Returns `None` when the model selects no operation; unknown names
    /// are returned as-is for the caller to reject.
    fn classify(
        &self,
        model: &str,
        utterance: &str,
        capabilities: &[CapabilityDecl],
    ) -> impl std::future::Future<Output = Result<Option<IntentCall>, MemoryError>> + Send;
}

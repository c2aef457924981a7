//! Sentence segmentation: one compound utterance into one-fact sentences.
//!
//! The language collaborator restates the input as canonical sentences,
//! one per item, keeping only the final location when an item moved.
//! Malformed collaborator output aborts the save with a remediation hint.

use serde_json::{Value, json};

use whereabouts_types::error::MemoryError;

use crate::inference::BoxInference;
use crate::prompt::SEGMENT_STATEMENT;

/// User-facing hint when the statement cannot be decomposed.
const UNINTELLIGIBLE_STATEMENT: &str = "Sorry, I couldn't understand that sentence. Please make \
     sure you're clearly mentioning where and what item you're referring to.";

/// Split a free-text statement into independent one-fact sentences.
#[tracing::instrument(skip(inference, text), fields(text_len = text.len()))]
pub async fn segment(
    inference: &BoxInference,
    model: &str,
    text: &str,
) -> Result<Vec<String>, MemoryError> {
    let result = inference
        .infer(model, &SEGMENT_STATEMENT, &json!({ "text": text }))
        .await?;
    parse_sentences(&result)
}

/// Parse the collaborator's `{"sentences": [...]}` payload.
pub fn parse_sentences(value: &Value) -> Result<Vec<String>, MemoryError> {
    let sentences: Vec<String> = value
        .get("sentences")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .filter(|s| !s.trim().is_empty())
                .collect()
        })
        .unwrap_or_default();

    if sentences.is_empty() {
        return Err(MemoryError::Ambiguous(UNINTELLIGIBLE_STATEMENT.to_string()));
    }
    Ok(sentences)
}

//! Fact extraction: one canonical sentence into one (location, item) pair.
//!
//! The collaborator answers with a single key-value pair (place -> item)
//! or an `error` field. Either side missing or empty is a tagged
//! `Ambiguous` failure, never a silent default.

use serde_json::{Value, json};

use whereabouts_types::error::MemoryError;

use crate::inference::BoxInference;
use crate::prompt::EXTRACT_FACT;

/// User-facing hint when a sentence yields no clean pair.
const UNCLEAR_SENTENCE: &str = "It looks like I couldn't extract both the 'location' and the \
     'item'. Please rephrase your sentence, for example: 'I kept my headphones in the drawer.'";

/// One extracted item-location pair, fields verbatim from the sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFact {
    pub location: String,
    pub item: String,
}

/// Extract the single fact described by one canonical sentence.
#[tracing::instrument(skip(inference, sentence))]
pub async fn extract(
    inference: &BoxInference,
    model: &str,
    sentence: &str,
) -> Result<ExtractedFact, MemoryError> {
    let result = inference
        .infer(model, &EXTRACT_FACT, &json!({ "input_text": sentence }))
        .await?;
    parse_extraction(&result)
}

/// Parse the collaborator's single-pair payload.
pub fn parse_extraction(value: &Value) -> Result<ExtractedFact, MemoryError> {
    let map = value
        .as_object()
        .ok_or_else(|| MemoryError::Ambiguous(UNCLEAR_SENTENCE.to_string()))?;

    if map.contains_key("error") {
        return Err(MemoryError::Ambiguous(UNCLEAR_SENTENCE.to_string()));
    }

    let (location, item) = map
        .iter()
        .next()
        .and_then(|(k, v)| v.as_str().map(|item| (k.as_str(), item)))
        .ok_or_else(|| MemoryError::Ambiguous(UNCLEAR_SENTENCE.to_string()))?;

    if location.trim().is_empty() || item.trim().is_empty() {
        return Err(MemoryError::Ambiguous(UNCLEAR_SENTENCE.to_string()));
    }

    Ok(ExtractedFact {
        location: location.to_string(),
        item: item.to_string(),
    })
}

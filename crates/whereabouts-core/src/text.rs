//! Text normalization helpers.
//!
//! Normalization happens only inside the matching layer; user-provided
//! spelling and casing are preserved everywhere they are shown back.

/// The wake phrase users may prefix statements with.
const INVOCATION_PREFIX: &str = "dear memory";

/// Lowercase and trim an item or location name for attribute matching.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Strip a leading "Dear Memory" invocation (any casing) from an utterance.
pub fn strip_invocation_prefix(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.get(..INVOCATION_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(INVOCATION_PREFIX) => {
            trimmed[INVOCATION_PREFIX.len()..].trim_start()
        }
        _ => trimmed,
    }
}

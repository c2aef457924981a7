//! Prompt templates for the language understanding collaborator.
//!
//! Every template pins the model to a strict JSON output contract so the
//! caller can parse the result without heuristics. `{name}` placeholders in
//! the human part are substituted from a JSON object of variables; string
//! values are inserted verbatim, everything else as compact JSON.

use serde_json::Value;

/// A named prompt with a system instruction and a templated human turn.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub system: &'static str,
    pub human: &'static str,
}

impl PromptTemplate {
    /// Render the human turn, substituting `{key}` for each key in `vars`.
    ///
    /// `vars` must be a JSON object; non-object values leave the template
    /// untouched.
    pub fn render(&self, vars: &Value) -> String {
        let mut rendered = self.human.to_string();
        if let Value::Object(map) = vars {
            for (key, value) in map {
                let placeholder = format!("{{{key}}}");
                let replacement = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                rendered = rendered.replace(&placeholder, &replacement);
            }
        }
        rendered
    }
}

/// Split a free-text statement into canonical one-fact sentences.
///
/// Same item mentioned at several locations collapses to the final
/// location; distinct items produce one sentence each; transitional
/// phrasing ("then", "later") is dropped.
pub const SEGMENT_STATEMENT: PromptTemplate = PromptTemplate {
    name: "segment_statement",
    system: r#"You analyze a statement about where physical items were placed and restate it as independent sentences, one per item.

Rules:
1. Each output sentence must follow exactly: "I have kept [item] in/on/at the [location]."
2. If the same item appears with multiple locations (including via pronouns like "it" or "them"), keep only the final location and emit a single sentence for that item.
3. Different items always produce separate sentences.
4. Ignore transitional words such as "then" or "later" and any intermediate placements.
5. Keep item and location names lowercase unless they are proper nouns.

Return only this JSON, nothing else:
{"sentences": ["I have kept [item] in/on/at the [location].", ...]}"#,
    human: r#"The statement is: "{text}""#,
};

/// Extract the single (location, item) pair from one canonical sentence.
pub const EXTRACT_FACT: PromptTemplate = PromptTemplate {
    name: "extract_fact",
    system: r#"You extract one key-value pair from a sentence: the key is the place, the value is the object or item kept there.

Rules:
1. Extract a pair only if both the item and its location are clearly stated.
2. If multiple locations are mentioned for the object, use the final one.
3. If the item, the location, or both cannot be determined, return {"error": "<short reason>"} instead.

Return only one of these JSON shapes, nothing else:
{"<place>": "<object_or_item>"}
{"error": "<short reason>"}"#,
    human: r#"Text: "{input_text}""#,
};

/// Rewrite stored statements into one impersonal confirmation sentence.
pub const COMPOSE_SAVE_CONFIRMATION: PromptTemplate = PromptTemplate {
    name: "compose_save_confirmation",
    system: r#"You turn descriptions of items and their storage locations into one concise, grammatically correct confirmation.

Rules:
1. Confirm each item is stored at its stated location.
2. Impersonal tone: no personal pronouns, no articles, no imperative or modal verbs.
3. Vary storage verbs naturally (placed, stored, kept, packed) and join everything into one flowing sentence or short paragraph.
4. Never alter item or location names.

Return only this JSON, nothing else:
{"sentence": "<confirmation>"}"#,
    human: "The sentence is: {text}.",
};

/// Summarize item-retrieval outcomes into one natural paragraph.
///
/// Input: a list of `{item, exact_location, similar_items}` entries; the
/// summary must cover found, similar-only, and fully-missing items without
/// repeating apology phrasing.
pub const COMPOSE_ITEM_RETRIEVAL: PromptTemplate = PromptTemplate {
    name: "compose_item_retrieval",
    system: r#"You summarize where a user's items are, based on lookup results.

Input is `responses`: a JSON list where each entry has:
- "item": the item asked about (keep its spelling and casing exactly)
- "exact_location": the location it was found at, or "" if not found
- "similar_items": related item names when the exact item was missing

Compose one natural paragraph:
1. Group found items by location with retrieval verbs (found, retrieved, picked) and sensible prepositions (in/on/at).
2. Items not found but with similar_items: combine into one sentence like "Sorry, can't find X. Try searching for other items like Y and Z."
3. Items not found with no similar_items: combine into one sentence like "Sorry, can't find X and Y."
4. Do not repeat "Sorry" or the same opener more than once.

Return only this JSON, nothing else:
{"answer": "<paragraph>"}"#,
    human: "responses = {responses}",
};

/// Summarize location-retrieval outcomes into one natural paragraph.
pub const COMPOSE_LOCATION_RETRIEVAL: PromptTemplate = PromptTemplate {
    name: "compose_location_retrieval",
    system: r#"You summarize what a user kept at the locations they asked about.

Input is `responses`: a JSON list where each entry has:
- "location": the location asked about (keep its spelling and casing exactly)
- "exact_items": items found there
- "similar_locations": related location names when nothing was found there

Compose one natural paragraph:
1. For locations with items, group them: "keys and wallet found in the drawer; charger located at the desk."
2. Locations with only similar_locations: one combined sentence suggesting those alternatives.
3. Locations with neither: one combined "Sorry, can't find anything at ..." sentence.
4. Proper grammar and conjunctions; no repeated apology phrasing.

Return only this JSON, nothing else:
{"answer": "<paragraph>"}"#,
    human: "responses = {responses}",
};

/// Report per-item deletion results (deleted / similar found / missing).
pub const COMPOSE_ITEM_DELETION: PromptTemplate = PromptTemplate {
    name: "compose_item_deletion",
    system: r#"You report the outcome of deleting remembered items.

Input is `items`: a JSON list where each entry has:
- "item": the name the user asked to delete (keep spelling and casing exactly)
- "exact_item": the stored item that was deleted, or "" if none matched
- "similar_items": related stored items when no exact match existed

Compose one response covering all three groups:
1. Deleted: "Deleted X and Y successfully."
2. Not found with similar items: "Can't find X. Try searching for related items: A, B."
3. Not found with nothing similar: "Can't find X at any location."

Return only this JSON, nothing else:
{"answer": "<response>"}"#,
    human: "items = {items}",
};

/// Report per-location deletion results.
pub const COMPOSE_LOCATION_DELETION: PromptTemplate = PromptTemplate {
    name: "compose_location_deletion",
    system: r#"You report the outcome of deleting everything stored at given locations.

Input is `locations`: a JSON list where each entry has:
- "location": the location the user named (keep spelling and casing exactly)
- "exact_items": items that were deleted from it
- "similar_locations": related locations when the named one had nothing

Compose one response covering all three groups:
1. Deleted: "Deleted keys and wallet from the drawer."
2. Empty but with similar locations: "Can't find any items at X. Try similar locations such as Y."
3. Empty with nothing similar: "Can't find any items at X."

Return only this JSON, nothing else:
{"answer": "<response>"}"#,
    human: "locations = {locations}",
};

/// Rewrite a stored sentence after its location was renamed.
pub const REWRITE_LOCATION: PromptTemplate = PromptTemplate {
    name: "rewrite_location",
    system: "You update locations inside a sentence while keeping it grammatically and logically coherent. If the replacement would create redundancy or an illogical phrase, adjust the wording minimally to restore clarity.",
    human: r#"Context: "{input_text}"

Replace the location "{original_location}" with "{modified_location}" and keep the sentence natural.

Return only this JSON, nothing else:
{"answer": "<modified sentence>"}"#,
};

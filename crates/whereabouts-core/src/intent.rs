//! Intent routing: closed tagged-variant dispatch over the memory
//! operations.
//!
//! Each operation is declared to the classifier as a capability (name,
//! purpose, typed parameter schema). The classifier returns a raw
//! [`IntentCall`]; [`MemoryIntent::from_call`] statically validates the
//! arguments into the matching variant before dispatch. Extracted
//! parameters pass through verbatim -- spelling, casing, and pluralization
//! are preserved for display; normalization happens only in the matching
//! layer.

use serde_json::{Value, json};

use whereabouts_types::error::MemoryError;

use crate::inference::{CapabilityDecl, IntentCall};

/// The six memory operations.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryIntent {
    /// Store one or more item-location facts from the utterance.
    Store,
    /// Delete the facts for the named items.
    DeleteItems { items: Vec<String> },
    /// Delete every fact stored at the named locations.
    DeleteLocations { locations: Vec<String> },
    /// Look up where the named items are.
    RetrieveItems { items: Vec<String> },
    /// Look up what is stored at the named locations.
    RetrieveLocations { locations: Vec<String> },
    /// Rename a location across the given facts (endpoint-routed; never
    /// returned by the classifier).
    RenameLocation {
        vector_ids: Vec<String>,
        original_location: String,
        modified_location: String,
    },
}

/// Capabilities offered when classifying a save-side utterance.
pub fn save_capabilities() -> Vec<CapabilityDecl> {
    vec![
        CapabilityDecl {
            name: "store_fact",
            description: "Store where an item has been placed, extracted from a statement \
                          describing the item and its location.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "item": {
                        "type": "string",
                        "description": "The object or item being placed or stored."
                    },
                    "location": {
                        "type": "string",
                        "description": "The place where the item has been stored."
                    }
                },
                "required": ["item", "location"]
            }),
        },
        CapabilityDecl {
            name: "delete_by_item",
            description: "Delete the memory of the item(s) exactly as the user names them. \
                          Never correct spelling, pluralization, or casing of an item name.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "items": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Item names to delete, kept exactly as the user typed them."
                    }
                },
                "required": ["items"]
            }),
        },
        CapabilityDecl {
            name: "delete_by_location",
            description: "Delete everything stored at the named location(s) exactly as the \
                          user names them. Never correct spelling, pluralization, or casing.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "locations": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Location names whose items are to be deleted, kept \
                                        exactly as the user typed them."
                    }
                },
                "required": ["locations"]
            }),
        },
    ]
}

/// Capabilities offered when classifying a retrieval query.
pub fn retrieve_capabilities() -> Vec<CapabilityDecl> {
    vec![
        CapabilityDecl {
            name: "retrieve_by_location",
            description: "Retrieve the items stored in specific locations, containers, or \
                          places. Only when the user is explicitly asking what a location \
                          holds, never for statements describing where items are. Keep all \
                          names exactly as the user typed them.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "locations": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Locations, containers, or places to list items from."
                    }
                },
                "required": ["locations"]
            }),
        },
        CapabilityDecl {
            name: "retrieve_by_item",
            description: "Retrieve where specific item(s) are. Only when the user is \
                          explicitly asking for an item's location, never for statements or \
                          past actions. Keep all names exactly as the user typed them.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "items": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Item names whose locations are requested."
                    }
                },
                "required": ["items"]
            }),
        },
    ]
}

impl MemoryIntent {
    /// Validate a raw classifier call into a typed intent.
    ///
    /// Unknown operation names and malformed arguments are rejected with
    /// `UnrecognizedIntent`; the caller turns that into a remediation
    /// response.
    pub fn from_call(call: IntentCall) -> Result<Self, MemoryError> {
        match call.name.as_str() {
            "store_fact" => Ok(MemoryIntent::Store),
            "delete_by_item" => Ok(MemoryIntent::DeleteItems {
                items: string_array(&call.args, "items")?,
            }),
            "delete_by_location" => Ok(MemoryIntent::DeleteLocations {
                locations: string_array(&call.args, "locations")?,
            }),
            "retrieve_by_item" => Ok(MemoryIntent::RetrieveItems {
                items: string_array(&call.args, "items")?,
            }),
            "retrieve_by_location" => Ok(MemoryIntent::RetrieveLocations {
                locations: string_array(&call.args, "locations")?,
            }),
            other => Err(MemoryError::UnrecognizedIntent(format!(
                "unknown operation '{other}'"
            ))),
        }
    }
}

/// Extract a non-null array of strings from classifier arguments.
fn string_array(args: &Value, key: &str) -> Result<Vec<String>, MemoryError> {
    let values = args
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| MemoryError::UnrecognizedIntent(format!("missing '{key}' argument")))?;

    values
        .iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                MemoryError::UnrecognizedIntent(format!("non-string entry in '{key}'"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: Value) -> IntentCall {
        IntentCall {
            name: name.to_string(),
            args,
        }
    }

    #[test]
    fn test_store_call_maps_to_store() {
        let intent =
            MemoryIntent::from_call(call("store_fact", json!({"item": "keys", "location": "drawer"})))
                .unwrap();
        assert_eq!(intent, MemoryIntent::Store);
    }

    #[test]
    fn test_delete_items_preserves_spelling() {
        let intent = MemoryIntent::from_call(call(
            "delete_by_item",
            json!({"items": ["chareger", "NoteBook"]}),
        ))
        .unwrap();
        assert_eq!(
            intent,
            MemoryIntent::DeleteItems {
                items: vec!["chareger".to_string(), "NoteBook".to_string()]
            }
        );
    }

    #[test]
    fn test_unknown_operation_rejected() {
        let err = MemoryIntent::from_call(call("forget_everything", json!({}))).unwrap_err();
        assert!(matches!(err, MemoryError::UnrecognizedIntent(_)));
    }

    #[test]
    fn test_missing_argument_rejected() {
        let err = MemoryIntent::from_call(call("delete_by_item", json!({}))).unwrap_err();
        assert!(matches!(err, MemoryError::UnrecognizedIntent(_)));
    }

    #[test]
    fn test_non_string_entry_rejected() {
        let err =
            MemoryIntent::from_call(call("retrieve_by_item", json!({"items": ["keys", 7]})))
                .unwrap_err();
        assert!(matches!(err, MemoryError::UnrecognizedIntent(_)));
    }

    #[test]
    fn test_capability_names_are_distinct() {
        let mut names: Vec<&str> = save_capabilities()
            .iter()
            .chain(retrieve_capabilities().iter())
            .map(|c| c.name)
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 5);
    }
}

//! End-to-end pipeline tests over fake collaborators.
//!
//! The fakes are deliberately small: scripted classifier/prompt results,
//! a map-backed embedder, and a cosine-scoring in-memory index shared
//! between service instances via `Arc`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use whereabouts_types::error::MemoryError;
use whereabouts_types::fact::{FactFilter, FactRecord, ScoredFact};

use crate::inference::{BoxInference, CapabilityDecl, Inference, IntentCall};
use crate::memory::{BoxEmbedder, BoxFactIndex, Embedder, FactIndex};
use crate::prompt::PromptTemplate;
use crate::service::{MemoryService, ServiceModels};

#[derive(Default)]
struct FakeInference {
    /// What `classify` returns, every time.
    classification: Option<IntentCall>,
    /// Segmentation output for any statement.
    sentences: Vec<String>,
    /// sentence -> (place, item); absent sentences fail extraction.
    extractions: HashMap<String, (String, String)>,
}

impl Inference for FakeInference {
    async fn infer(
        &self,
        _model: &str,
        prompt: &PromptTemplate,
        vars: &Value,
    ) -> Result<Value, MemoryError> {
        match prompt.name {
            "segment_statement" => Ok(json!({ "sentences": self.sentences })),
            "extract_fact" => {
                let sentence = vars["input_text"].as_str().unwrap_or_default();
                match self.extractions.get(sentence) {
                    Some((place, item)) => Ok(json!({ place: item })),
                    None => Ok(json!({ "error": "could not determine item and location" })),
                }
            }
            "compose_save_confirmation" => {
                Ok(json!({ "sentence": format!("noted: {}", vars["text"]) }))
            }
            "rewrite_location" => Ok(json!({
                "answer": format!(
                    "{} (now at {})",
                    vars["input_text"].as_str().unwrap_or_default(),
                    vars["modified_location"].as_str().unwrap_or_default()
                )
            })),
            // Composition prompts echo their input so tests can assert
            // every category made it into the final answer.
            _ => Ok(json!({ "answer": vars.to_string() })),
        }
    }

    async fn classify(
        &self,
        _model: &str,
        _utterance: &str,
        _capabilities: &[CapabilityDecl],
    ) -> Result<Option<IntentCall>, MemoryError> {
        Ok(self.classification.clone())
    }
}

struct FakeEmbedder {
    /// text -> vector; anything else embeds to the default direction.
    vectors: HashMap<String, Vec<f32>>,
}

impl FakeEmbedder {
    fn new() -> Self {
        Self {
            vectors: HashMap::new(),
        }
    }

    fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

impl Embedder for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        Ok(texts
            .iter()
            .map(|t| self.vectors.get(t).cloned().unwrap_or(vec![1.0, 0.0]))
            .collect())
    }

    fn model_name(&self) -> &str {
        "fake-embedder"
    }

    fn dimension(&self) -> usize {
        2
    }
}

/// Cosine-scoring in-memory index; `Clone` shares the same store.
#[derive(Clone, Default)]
struct FakeIndex {
    records: Arc<Mutex<HashMap<String, FactRecord>>>,
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 { 0.0 } else { dot / (na * nb) }
}

impl FakeIndex {
    fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn get(&self, id: &str) -> Option<FactRecord> {
        self.records.lock().unwrap().get(id).cloned()
    }
}

impl FactIndex for FakeIndex {
    async fn upsert(&self, records: &[FactRecord]) -> Result<(), MemoryError> {
        let mut store = self.records.lock().unwrap();
        for record in records {
            store.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<FactRecord>, MemoryError> {
        let store = self.records.lock().unwrap();
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }

    async fn delete(&self, ids: &[String]) -> Result<(), MemoryError> {
        let mut store = self.records.lock().unwrap();
        for id in ids {
            store.remove(id);
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &FactFilter,
    ) -> Result<Vec<ScoredFact>, MemoryError> {
        let store = self.records.lock().unwrap();
        let mut matches: Vec<ScoredFact> = store
            .values()
            .filter(|r| r.attributes.owner_id == filter.owner_id)
            .filter(|r| {
                filter
                    .item
                    .as_ref()
                    .is_none_or(|item| &r.attributes.item == item)
            })
            .filter(|r| {
                filter
                    .location
                    .as_ref()
                    .is_none_or(|location| &r.attributes.location == location)
            })
            .map(|r| ScoredFact {
                id: r.id.clone(),
                score: cosine(vector, &r.values),
                attributes: r.attributes.clone(),
            })
            .collect();
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        matches.truncate(top_k);
        Ok(matches)
    }
}

fn service(inference: FakeInference, embedder: FakeEmbedder, index: FakeIndex) -> MemoryService {
    MemoryService::new(
        BoxInference::new(inference),
        BoxEmbedder::new(embedder),
        BoxFactIndex::new(index),
        ServiceModels {
            generation: "fake-gen".to_string(),
            retrieval: "fake-ret".to_string(),
        },
    )
}

fn store_call() -> Option<IntentCall> {
    Some(IntentCall {
        name: "store_fact".to_string(),
        args: json!({"item": "keys", "location": "drawer"}),
    })
}

fn keys_in_drawer() -> FakeInference {
    FakeInference {
        classification: store_call(),
        sentences: vec!["I have kept keys in the drawer.".to_string()],
        extractions: HashMap::from([(
            "I have kept keys in the drawer.".to_string(),
            ("drawer".to_string(), "keys".to_string()),
        )]),
    }
}

#[tokio::test]
async fn test_save_stores_one_fact() {
    let index = FakeIndex::default();
    let svc = service(keys_in_drawer(), FakeEmbedder::new(), index.clone());

    let response = svc.save(1, "I kept my keys in the drawer").await.unwrap();
    assert_eq!(response.items.len(), 1);
    assert_eq!(response.items[0].item, "keys");
    assert_eq!(response.items[0].location, "drawer");
    assert!(response.deleted_entries.is_empty());
    assert_eq!(index.len(), 1);
}

#[tokio::test]
async fn test_save_same_fact_twice_is_duplicate_not_second_record() {
    let index = FakeIndex::default();
    let svc = service(keys_in_drawer(), FakeEmbedder::new(), index.clone());
    svc.save(1, "I kept my keys in the drawer").await.unwrap();

    let svc = service(keys_in_drawer(), FakeEmbedder::new(), index.clone());
    let err = svc.save(1, "I kept my keys in the drawer").await.unwrap_err();
    match err {
        MemoryError::Validation(message) => {
            assert!(message.contains("Similar memory already exists"))
        }
        other => panic!("expected duplicate validation error, got {other:?}"),
    }
    assert_eq!(index.len(), 1);
}

#[tokio::test]
async fn test_save_same_item_new_location_supersedes() {
    let index = FakeIndex::default();
    let svc = service(keys_in_drawer(), FakeEmbedder::new(), index.clone());
    let first = svc.save(1, "I kept my keys in the drawer").await.unwrap();
    let first_id = first.items[0].vector_id.clone();

    let moved = FakeInference {
        classification: store_call(),
        sentences: vec!["I have kept keys on the shelf.".to_string()],
        extractions: HashMap::from([(
            "I have kept keys on the shelf.".to_string(),
            ("shelf".to_string(), "keys".to_string()),
        )]),
    };
    let svc = service(moved, FakeEmbedder::new(), index.clone());
    let second = svc.save(1, "I moved my keys to the shelf").await.unwrap();

    assert_eq!(second.deleted_entries, vec![first_id.clone()]);
    assert_eq!(index.len(), 1);
    assert!(index.get(&first_id).is_none());
    let remaining = index.get(&second.items[0].vector_id).unwrap();
    assert_eq!(remaining.attributes.location, "shelf");
}

#[tokio::test]
async fn test_save_batch_is_all_or_nothing() {
    // Three sentences, the middle one fails extraction: nothing persists.
    let inference = FakeInference {
        classification: store_call(),
        sentences: vec![
            "I have kept keys in the drawer.".to_string(),
            "I have kept the thing somewhere.".to_string(),
            "I have kept wallet on the desk.".to_string(),
        ],
        extractions: HashMap::from([
            (
                "I have kept keys in the drawer.".to_string(),
                ("drawer".to_string(), "keys".to_string()),
            ),
            (
                "I have kept wallet on the desk.".to_string(),
                ("desk".to_string(), "wallet".to_string()),
            ),
        ]),
    };
    let index = FakeIndex::default();
    let svc = service(inference, FakeEmbedder::new(), index.clone());

    let err = svc.save(1, "keys drawer, thing somewhere, wallet desk").await.unwrap_err();
    assert!(matches!(err, MemoryError::Ambiguous(_)));
    assert_eq!(index.len(), 0);
}

#[tokio::test]
async fn test_save_unclassified_statement_is_unrecognized() {
    let inference = FakeInference {
        classification: None,
        ..FakeInference::default()
    };
    let svc = service(inference, FakeEmbedder::new(), FakeIndex::default());
    let err = svc.save(1, "blue is a nice color").await.unwrap_err();
    assert!(matches!(err, MemoryError::UnrecognizedIntent(_)));
}

#[tokio::test]
async fn test_delete_by_item_removes_current_fact() {
    let index = FakeIndex::default();
    let svc = service(keys_in_drawer(), FakeEmbedder::new(), index.clone());
    svc.save(1, "I kept my keys in the drawer").await.unwrap();

    let deleter = FakeInference {
        classification: Some(IntentCall {
            name: "delete_by_item".to_string(),
            args: json!({"items": ["keys"]}),
        }),
        ..FakeInference::default()
    };
    let svc = service(deleter, FakeEmbedder::new(), index.clone());
    let response = svc.save(1, "forget my keys").await.unwrap();

    assert_eq!(response.deleted_entries.len(), 1);
    assert_eq!(index.len(), 0);
}

#[tokio::test]
async fn test_retrieve_aggregates_all_three_buckets() {
    let index = FakeIndex::default();
    let svc = service(keys_in_drawer(), FakeEmbedder::new(), index.clone());
    svc.save(1, "I kept my keys in the drawer").await.unwrap();

    let retriever = FakeInference {
        classification: Some(IntentCall {
            name: "retrieve_by_item".to_string(),
            args: json!({"items": ["keys", "charger", "umbrella"]}),
        }),
        ..FakeInference::default()
    };
    // "charger" misses exactly but lands near the stored vector;
    // "umbrella" is orthogonal to everything.
    let embedder = FakeEmbedder::new().with("Where is umbrella", vec![0.0, 1.0]);
    let svc = service(retriever, embedder, index.clone());

    let response = svc.retrieve(1, "where are my keys, charger and umbrella?").await.unwrap();
    assert_eq!(response.status, 200);
    // The echoing composer exposes the aggregation input: found item with
    // its location, similar suggestions for the near miss, and the fully
    // unmatched target.
    assert!(response.answer.contains("drawer"));
    assert!(response.answer.contains("charger"));
    assert!(response.answer.contains("umbrella"));
}

#[tokio::test]
async fn test_retrieve_nothing_resolved_is_404() {
    let index = FakeIndex::default();
    let retriever = FakeInference {
        classification: Some(IntentCall {
            name: "retrieve_by_item".to_string(),
            args: json!({"items": ["umbrella"]}),
        }),
        ..FakeInference::default()
    };
    let embedder = FakeEmbedder::new().with("Where is umbrella", vec![0.0, 1.0]);
    let svc = service(retriever, embedder, index);

    let response = svc.retrieve(1, "where is my umbrella?").await.unwrap();
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn test_retrieve_by_location_lists_items() {
    let index = FakeIndex::default();
    let svc = service(keys_in_drawer(), FakeEmbedder::new(), index.clone());
    svc.save(1, "I kept my keys in the drawer").await.unwrap();

    let retriever = FakeInference {
        classification: Some(IntentCall {
            name: "retrieve_by_location".to_string(),
            args: json!({"locations": ["drawer"]}),
        }),
        ..FakeInference::default()
    };
    let svc = service(retriever, FakeEmbedder::new(), index);
    let response = svc.retrieve(1, "what's in the drawer?").await.unwrap();
    assert_eq!(response.status, 200);
    assert!(response.answer.contains("keys"));
}

#[tokio::test]
async fn test_owner_isolation_on_delete_and_rename() {
    let index = FakeIndex::default();
    let svc = service(keys_in_drawer(), FakeEmbedder::new(), index.clone());
    let saved = svc.save(1, "I kept my keys in the drawer").await.unwrap();
    let id = saved.items[0].vector_id.clone();

    // A different owner cannot delete or rename the fact.
    let svc = service(FakeInference::default(), FakeEmbedder::new(), index.clone());
    let err = svc.delete_facts(2, std::slice::from_ref(&id)).await.unwrap_err();
    assert!(matches!(err, MemoryError::NotFound(_)));

    let err = svc
        .rename_location(2, std::slice::from_ref(&id), "drawer", "shelf")
        .await
        .unwrap_err();
    assert!(matches!(err, MemoryError::NotFound(_)));

    assert!(index.get(&id).is_some());
}

#[tokio::test]
async fn test_rename_rewrites_text_and_location() {
    let index = FakeIndex::default();
    let svc = service(keys_in_drawer(), FakeEmbedder::new(), index.clone());
    let saved = svc.save(1, "I kept my keys in the drawer").await.unwrap();
    let id = saved.items[0].vector_id.clone();
    let original_values = index.get(&id).unwrap().values;

    let svc = service(FakeInference::default(), FakeEmbedder::new(), index.clone());
    let message = svc
        .rename_location(1, std::slice::from_ref(&id), "drawer", "Shelf")
        .await
        .unwrap();
    assert_eq!(message, "Location renamed successfully.");

    let record = index.get(&id).unwrap();
    assert_eq!(record.attributes.location, "shelf");
    assert!(record.attributes.original_text.contains("now at Shelf"));
    // Embedding is preserved across the rewrite.
    assert_eq!(record.values, original_values);
}

#[tokio::test]
async fn test_delete_facts_by_id() {
    let index = FakeIndex::default();
    let svc = service(keys_in_drawer(), FakeEmbedder::new(), index.clone());
    let saved = svc.save(1, "I kept my keys in the drawer").await.unwrap();
    let id = saved.items[0].vector_id.clone();

    let svc = service(FakeInference::default(), FakeEmbedder::new(), index.clone());
    let message = svc.delete_facts(1, &[id]).await.unwrap();
    assert_eq!(message, "Location deleted successfully.");
    assert_eq!(index.len(), 0);
}

//! Retrieval pipeline: classify the query, fan out per target, compose one
//! answer.

use std::collections::HashSet;

use serde_json::{Value, json};

use whereabouts_types::error::MemoryError;
use whereabouts_types::query::RetrieveResponse;

use super::MemoryService;
use crate::batch::{self, TargetOutcome};
use crate::intent::{self, MemoryIntent};
use crate::matcher::{ITEM_RETRIEVAL_MIN_SCORE, LOCATION_RETRIEVAL_MIN_SCORE};
use crate::prompt::{COMPOSE_ITEM_RETRIEVAL, COMPOSE_LOCATION_RETRIEVAL};
use crate::text::strip_invocation_prefix;

const QUERY_NOT_UNDERSTOOD: &str =
    "Sorry, I am not able to process the query. Please rephrase and try again.";
const ITEM_TARGETS_EMPTY: &str =
    "Sorry, I am not able to understand the item you are asking for. Please try again.";
const LOCATION_TARGETS_EMPTY: &str =
    "Sorry, I am not able to understand the location you are asking for. Please try again.";

impl MemoryService {
    /// Answer "where is X" / "what is at Y" queries.
    ///
    /// The response's `status` field mirrors the HTTP status: 200 when at
    /// least one target resolved, 404 otherwise (the composed answer still
    /// describes every target either way).
    #[tracing::instrument(skip(self, text), fields(owner_id = owner_id))]
    pub async fn retrieve(
        &self,
        owner_id: i64,
        text: &str,
    ) -> Result<RetrieveResponse, MemoryError> {
        let text = strip_invocation_prefix(text);
        let call = self
            .inference
            .classify(&self.models.retrieval, text, &intent::retrieve_capabilities())
            .await?;
        let Some(call) = call else {
            return Err(MemoryError::UnrecognizedIntent(
                QUERY_NOT_UNDERSTOOD.to_string(),
            ));
        };

        match MemoryIntent::from_call(call) {
            Ok(MemoryIntent::RetrieveItems { items }) => {
                self.retrieve_by_items(owner_id, items).await
            }
            Ok(MemoryIntent::RetrieveLocations { locations }) => {
                self.retrieve_by_locations(owner_id, locations).await
            }
            Ok(_) | Err(_) => Err(MemoryError::UnrecognizedIntent(
                QUERY_NOT_UNDERSTOOD.to_string(),
            )),
        }
    }

    async fn retrieve_by_items(
        &self,
        owner_id: i64,
        items: Vec<String>,
    ) -> Result<RetrieveResponse, MemoryError> {
        if items.is_empty() {
            return Err(MemoryError::Validation(ITEM_TARGETS_EMPTY.to_string()));
        }

        let batch = batch::run(&items, self.policy, |_, item| async move {
            let question = format!("Where is {item}");
            let vector = self.matcher.embed_one(&question).await?;

            if let Some(current) = self
                .matcher
                .current_fact_for_item(owner_id, &item, &vector)
                .await?
            {
                Ok(TargetOutcome {
                    target: item,
                    exact: vec![current.attributes.location],
                    similar: Vec::new(),
                    deleted: Vec::new(),
                })
            } else {
                let similar = self
                    .matcher
                    .similar_items(owner_id, &vector, ITEM_RETRIEVAL_MIN_SCORE)
                    .await?;
                Ok(TargetOutcome {
                    target: item,
                    exact: Vec::new(),
                    similar,
                    deleted: Vec::new(),
                })
            }
        })
        .await?;

        let responses: Vec<Value> = batch
            .outcomes
            .iter()
            .map(|o| {
                json!({
                    "item": o.target,
                    "exact_location": o.exact.first().cloned().unwrap_or_default(),
                    "similar_items": o.similar,
                })
            })
            .collect();

        let answer = self
            .compose_answer(&COMPOSE_ITEM_RETRIEVAL, &json!({ "responses": responses }))
            .await?;
        let status = if batch.any_resolved() { 200 } else { 404 };
        Ok(RetrieveResponse { answer, status })
    }

    async fn retrieve_by_locations(
        &self,
        owner_id: i64,
        locations: Vec<String>,
    ) -> Result<RetrieveResponse, MemoryError> {
        if locations.is_empty() {
            return Err(MemoryError::Validation(LOCATION_TARGETS_EMPTY.to_string()));
        }

        let batch = batch::run(&locations, self.policy, |_, location| async move {
            let question = format!("What did I keep in {location}?");
            let vector = self.matcher.embed_one(&question).await?;

            let matches = self
                .matcher
                .exact_by_location(owner_id, &location, &vector)
                .await?;
            if !matches.is_empty() {
                let mut seen = HashSet::new();
                let items: Vec<String> = matches
                    .into_iter()
                    .filter_map(|m| {
                        seen.insert(m.attributes.item.clone())
                            .then_some(m.attributes.item)
                    })
                    .collect();
                Ok(TargetOutcome {
                    target: location,
                    exact: items,
                    similar: Vec::new(),
                    deleted: Vec::new(),
                })
            } else {
                let similar = self
                    .matcher
                    .similar_locations(owner_id, &vector, LOCATION_RETRIEVAL_MIN_SCORE)
                    .await?;
                Ok(TargetOutcome {
                    target: location,
                    exact: Vec::new(),
                    similar,
                    deleted: Vec::new(),
                })
            }
        })
        .await?;

        let responses: Vec<Value> = batch
            .outcomes
            .iter()
            .map(|o| {
                json!({
                    "location": o.target,
                    "exact_items": o.exact,
                    "similar_locations": o.similar,
                })
            })
            .collect();

        let answer = self
            .compose_answer(
                &COMPOSE_LOCATION_RETRIEVAL,
                &json!({ "responses": responses }),
            )
            .await?;
        let status = if batch.any_resolved() { 200 } else { 404 };
        Ok(RetrieveResponse { answer, status })
    }
}

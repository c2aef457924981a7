//! Deletion pipelines: by item name, by location name, and by fact id.

use serde_json::{Value, json};

use whereabouts_types::error::MemoryError;
use whereabouts_types::query::SaveMemoryResponse;

use super::MemoryService;
use crate::batch::{self, TargetOutcome};
use crate::matcher::{ITEM_DELETION_MIN_SCORE, LOCATION_DELETION_MIN_SCORE};
use crate::prompt::{COMPOSE_ITEM_DELETION, COMPOSE_LOCATION_DELETION};

impl MemoryService {
    /// Delete the current fact for each named item. Misses fall back to
    /// similar-item suggestions; a batch where nothing was deleted reports
    /// not-found with the composed explanation.
    #[tracing::instrument(skip(self, items), fields(owner_id = owner_id, targets = items.len()))]
    pub(crate) async fn delete_by_items(
        &self,
        owner_id: i64,
        items: Vec<String>,
    ) -> Result<SaveMemoryResponse, MemoryError> {
        let batch = batch::run(&items, self.policy, |_, item| async move {
            let question = format!("Where is {item}?");
            let vector = self.matcher.embed_one(&question).await?;

            if let Some(current) = self
                .matcher
                .current_fact_for_item(owner_id, &item, &vector)
                .await?
            {
                self.index.delete(std::slice::from_ref(&current.id)).await?;
                Ok(TargetOutcome {
                    target: item,
                    exact: vec![current.attributes.item],
                    similar: Vec::new(),
                    deleted: vec![current.id],
                })
            } else {
                let similar = self
                    .matcher
                    .similar_items(owner_id, &vector, ITEM_DELETION_MIN_SCORE)
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

        let prompt_items: Vec<Value> = batch
            .outcomes
            .iter()
            .map(|o| {
                json!({
                    "item": o.target,
                    "exact_item": o.exact.first().cloned().unwrap_or_default(),
                    "similar_items": o.similar,
                })
            })
            .collect();

        let answer = self
            .compose_answer(&COMPOSE_ITEM_DELETION, &json!({ "items": prompt_items }))
            .await?;

        if !batch.any_resolved() {
            return Err(MemoryError::NotFound(answer));
        }

        Ok(SaveMemoryResponse {
            user_id: owner_id,
            success_message: answer,
            deleted_entries: batch.deleted_ids(),
            items: Vec::new(),
        })
    }

    /// Delete everything stored at each named location.
    #[tracing::instrument(skip(self, locations), fields(owner_id = owner_id, targets = locations.len()))]
    pub(crate) async fn delete_by_locations(
        &self,
        owner_id: i64,
        locations: Vec<String>,
    ) -> Result<SaveMemoryResponse, MemoryError> {
        let batch = batch::run(&locations, self.policy, |_, location| async move {
            let question = format!("What did I keep at {location}?");
            let vector = self.matcher.embed_one(&question).await?;

            let matches = self
                .matcher
                .exact_by_location(owner_id, &location, &vector)
                .await?;
            if !matches.is_empty() {
                let ids: Vec<String> = matches.iter().map(|m| m.id.clone()).collect();
                self.index.delete(&ids).await?;
                let items: Vec<String> =
                    matches.into_iter().map(|m| m.attributes.item).collect();
                Ok(TargetOutcome {
                    target: location,
                    exact: items,
                    similar: Vec::new(),
                    deleted: ids,
                })
            } else {
                let similar = self
                    .matcher
                    .similar_locations(owner_id, &vector, LOCATION_DELETION_MIN_SCORE)
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

        let prompt_locations: Vec<Value> = batch
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
                &COMPOSE_LOCATION_DELETION,
                &json!({ "locations": prompt_locations }),
            )
            .await?;

        if !batch.any_resolved() {
            return Err(MemoryError::NotFound(answer));
        }

        Ok(SaveMemoryResponse {
            user_id: owner_id,
            success_message: answer,
            deleted_entries: batch.deleted_ids(),
            items: Vec::new(),
        })
    }

    /// Delete specific facts by id. Ids not owned by the caller are
    /// ignored; if none remain, nothing matched.
    #[tracing::instrument(skip(self, ids), fields(owner_id = owner_id, ids = ids.len()))]
    pub async fn delete_facts(
        &self,
        owner_id: i64,
        ids: &[String],
    ) -> Result<String, MemoryError> {
        let records = self.owned_records(owner_id, ids).await?;
        if records.is_empty() {
            return Err(MemoryError::NotFound(
                "No matching location found.".to_string(),
            ));
        }

        let owned_ids: Vec<String> = records.into_iter().map(|r| r.id).collect();
        self.index.delete(&owned_ids).await?;
        Ok("Location deleted successfully.".to_string())
    }
}

//! Rename pipeline: rewrite stored sentences for a renamed location.

use futures_util::future;
use serde_json::{Value, json};

use whereabouts_types::error::MemoryError;
use whereabouts_types::fact::FactRecord;

use super::MemoryService;
use crate::prompt::REWRITE_LOCATION;
use crate::text::normalize;

impl MemoryService {
    /// Rename a location across the given facts.
    ///
    /// Ids not owned by the caller are dropped silently; if none remain the
    /// operation reports not-found. Each fact's provenance sentence is
    /// rewritten by the language collaborator; id and embedding are
    /// preserved, and all rewrites land in one bulk upsert. One failed
    /// rewrite aborts the whole batch with nothing applied.
    #[tracing::instrument(
        skip(self, ids, original_location, modified_location),
        fields(owner_id = owner_id, ids = ids.len())
    )]
    pub async fn rename_location(
        &self,
        owner_id: i64,
        ids: &[String],
        original_location: &str,
        modified_location: &str,
    ) -> Result<String, MemoryError> {
        let new_location = normalize(modified_location);
        if new_location.is_empty() {
            return Err(MemoryError::Validation(
                "The new location name must not be empty.".to_string(),
            ));
        }

        let records = self.owned_records(owner_id, ids).await?;
        if records.is_empty() {
            return Err(MemoryError::NotFound("No memories found.".to_string()));
        }

        let rewritten = future::try_join_all(records.into_iter().map(|record| {
            self.rewrite_record(record, original_location, modified_location, &new_location)
        }))
        .await?;

        self.index.upsert(&rewritten).await?;
        Ok("Location renamed successfully.".to_string())
    }

    async fn rewrite_record(
        &self,
        mut record: FactRecord,
        original_location: &str,
        modified_location: &str,
        new_location: &str,
    ) -> Result<FactRecord, MemoryError> {
        let result = self
            .inference
            .infer(
                &self.models.generation,
                &REWRITE_LOCATION,
                &json!({
                    "input_text": record.attributes.original_text,
                    "original_location": original_location,
                    "modified_location": modified_location,
                }),
            )
            .await?;

        let answer = result
            .get("answer")
            .and_then(Value::as_str)
            .ok_or_else(|| MemoryError::Inference("rewrite returned no answer".to_string()))?;

        record.attributes.original_text = answer.to_string();
        record.attributes.location = new_location.to_string();
        Ok(record)
    }
}

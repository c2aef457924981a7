//! Save pipeline: classify, segment, extract, reconcile, bulk apply.

use futures_util::future;
use serde_json::{Value, json};

use whereabouts_types::error::MemoryError;
use whereabouts_types::fact::MemoryFact;
use whereabouts_types::query::SaveMemoryResponse;

use super::MemoryService;
use crate::intent::{self, MemoryIntent};
use crate::prompt::COMPOSE_SAVE_CONFIRMATION;
use crate::reconcile::{Reconciliation, ReconcilePlan, SentenceOutcome, reconcile};
use crate::text::{normalize, strip_invocation_prefix};
use crate::{extractor, segmenter};

const STATEMENT_NOT_UNDERSTOOD: &str =
    "Sorry, not able to understand the statement. Please try again.";

impl MemoryService {
    /// Store or delete facts from a free-text statement.
    ///
    /// The statement is classified into store / delete-by-item /
    /// delete-by-location; storing decomposes it into one-fact sentences
    /// and reconciles each against the owner's existing facts. All writes
    /// for one statement land atomically after every sentence classified.
    #[tracing::instrument(skip(self, text), fields(owner_id = owner_id))]
    pub async fn save(
        &self,
        owner_id: i64,
        text: &str,
    ) -> Result<SaveMemoryResponse, MemoryError> {
        let text = strip_invocation_prefix(text);
        if text.is_empty() {
            return Err(MemoryError::Validation(
                STATEMENT_NOT_UNDERSTOOD.to_string(),
            ));
        }

        let call = self
            .inference
            .classify(&self.models.generation, text, &intent::save_capabilities())
            .await?;
        let Some(call) = call else {
            return Err(MemoryError::UnrecognizedIntent(
                STATEMENT_NOT_UNDERSTOOD.to_string(),
            ));
        };

        match MemoryIntent::from_call(call) {
            Ok(MemoryIntent::Store) => self.store_facts(owner_id, text).await,
            Ok(MemoryIntent::DeleteItems { items }) => {
                self.delete_by_items(owner_id, items).await
            }
            Ok(MemoryIntent::DeleteLocations { locations }) => {
                self.delete_by_locations(owner_id, locations).await
            }
            Ok(_) | Err(_) => Err(MemoryError::UnrecognizedIntent(
                STATEMENT_NOT_UNDERSTOOD.to_string(),
            )),
        }
    }

    /// The insert pipeline proper: segment, embed once as a batch, then
    /// reconcile every sentence before any write.
    async fn store_facts(
        &self,
        owner_id: i64,
        text: &str,
    ) -> Result<SaveMemoryResponse, MemoryError> {
        let sentences =
            segmenter::segment(&self.inference, &self.models.generation, text).await?;
        let embeddings = self.embedder.embed(&sentences).await?;
        if embeddings.len() != sentences.len() {
            return Err(MemoryError::Embedding(format!(
                "embedder returned {} vectors for {} sentences",
                embeddings.len(),
                sentences.len()
            )));
        }

        let outcomes = future::try_join_all(
            sentences
                .iter()
                .zip(embeddings)
                .map(|(sentence, embedding)| self.process_sentence(owner_id, sentence, embedding)),
        )
        .await?;

        let mut plan = ReconcilePlan::default();
        for outcome in outcomes {
            plan.merge(outcome);
        }

        if plan.has_duplicates() {
            let existing = plan.duplicates.join(" ");
            let sentence = self
                .compose_sentence(json!({ "text": existing }))
                .await
                .unwrap_or(existing);
            return Err(MemoryError::Validation(format!(
                "Similar memory already exists: '{sentence}'. Please try again with a different \
                 sentence."
            )));
        }

        plan.apply(&self.index).await?;

        let success_message = match self.compose_sentence(json!({ "text": text })).await {
            Ok(sentence) => sentence,
            Err(err) => {
                tracing::warn!(error = %err, "confirmation composition failed; echoing input");
                text.to_string()
            }
        };

        Ok(SaveMemoryResponse {
            user_id: owner_id,
            success_message,
            deleted_entries: plan.deletes.clone(),
            items: plan.stored.clone(),
        })
    }

    /// Extract and reconcile one sentence. The sentence's own embedding
    /// doubles as the lookup vector for the existing-fact check and as the
    /// stored vector.
    async fn process_sentence(
        &self,
        owner_id: i64,
        sentence: &str,
        embedding: Vec<f32>,
    ) -> Result<SentenceOutcome, MemoryError> {
        let extracted =
            extractor::extract(&self.inference, &self.models.generation, sentence).await?;
        let item = normalize(&extracted.item);
        let location = normalize(&extracted.location);

        let existing = self
            .matcher
            .current_fact_for_item(owner_id, &item, &embedding)
            .await?;
        let decision = reconcile(existing.as_ref(), &location);

        let record = match decision {
            Reconciliation::Duplicate { .. } => None,
            _ => Some(
                MemoryFact::new(owner_id, item, location, sentence.to_string())
                    .into_record(embedding),
            ),
        };

        Ok(SentenceOutcome { decision, record })
    }

    /// Rewrite stored text into an impersonal confirmation. Degrades to the
    /// raw text on composer failure; the save itself already succeeded.
    async fn compose_sentence(&self, vars: Value) -> Result<String, MemoryError> {
        let result = self
            .inference
            .infer(&self.models.generation, &COMPOSE_SAVE_CONFIRMATION, &vars)
            .await?;
        result
            .get("sentence")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                MemoryError::Inference("confirmation composer returned no sentence".to_string())
            })
    }
}

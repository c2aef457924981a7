//! Pinecone-backed fact index over the data-plane HTTP API.
//!
//! Records map 1:1 onto Pinecone vectors: the fact id is the vector id,
//! the embedding is the vector, and [`FactAttributes`] serializes to the
//! metadata object (`userId`, `item`, `location`, `originalText`,
//! `datetime`), which is what filtered queries match against.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and sent only via
//! the `Api-Key` header.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use whereabouts_core::memory::FactIndex;
use whereabouts_types::error::MemoryError;
use whereabouts_types::fact::{FactAttributes, FactFilter, FactRecord, ScoredFact};

/// Remote Pinecone index client.
pub struct PineconeIndex {
    client: reqwest::Client,
    api_key: SecretString,
    /// Index host, e.g. `https://my-index.svc.us-east1.pinecone.io`.
    host: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireVector {
    id: String,
    values: Vec<f32>,
    metadata: FactAttributes,
}

impl From<&FactRecord> for WireVector {
    fn from(record: &FactRecord) -> Self {
        Self {
            id: record.id.clone(),
            values: record.values.clone(),
            metadata: record.attributes.clone(),
        }
    }
}

impl From<WireVector> for FactRecord {
    fn from(vector: WireVector) -> Self {
        Self {
            id: vector.id,
            values: vector.values,
            attributes: vector.metadata,
        }
    }
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    vectors: Vec<WireVector>,
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    vector: Vec<f32>,
    #[serde(rename = "topK")]
    top_k: usize,
    filter: Value,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize)]
struct WireMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: FactAttributes,
}

#[derive(Debug, Deserialize)]
struct FetchResponse {
    #[serde(default)]
    vectors: HashMap<String, WireVector>,
}

#[derive(Debug, Serialize)]
struct DeleteRequest {
    ids: Vec<String>,
}

/// Build the metadata filter object: owner scoping always, exact item or
/// location when requested.
fn filter_json(filter: &FactFilter) -> Value {
    let mut map = serde_json::Map::new();
    map.insert("userId".to_string(), json!(filter.owner_id));
    if let Some(item) = &filter.item {
        map.insert("item".to_string(), json!(item));
    }
    if let Some(location) = &filter.location {
        map.insert("location".to_string(), json!(location));
    }
    Value::Object(map)
}

impl PineconeIndex {
    pub fn new(api_key: SecretString, host: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            host,
        }
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<reqwest::Response, MemoryError> {
        let response = self
            .client
            .post(format!("{}{path}", self.host))
            .header("Api-Key", self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| MemoryError::Index(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let line = body.lines().next().unwrap_or_default();
            return Err(MemoryError::Index(format!(
                "pinecone returned {status}: {line}"
            )));
        }
        Ok(response)
    }
}

impl FactIndex for PineconeIndex {
    #[tracing::instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert(&self, records: &[FactRecord]) -> Result<(), MemoryError> {
        if records.is_empty() {
            return Ok(());
        }
        let request = UpsertRequest {
            vectors: records.iter().map(WireVector::from).collect(),
        };
        self.post("/vectors/upsert", &request).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    async fn fetch(&self, ids: &[String]) -> Result<Vec<FactRecord>, MemoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let params: Vec<(&str, &str)> = ids.iter().map(|id| ("ids", id.as_str())).collect();
        let response = self
            .client
            .get(format!("{}/vectors/fetch", self.host))
            .header("Api-Key", self.api_key.expose_secret())
            .query(&params)
            .send()
            .await
            .map_err(|e| MemoryError::Index(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MemoryError::Index(format!("pinecone returned {status}")));
        }

        let body: FetchResponse = response
            .json()
            .await
            .map_err(|e| MemoryError::Index(format!("invalid fetch response: {e}")))?;

        Ok(body.vectors.into_values().map(FactRecord::from).collect())
    }

    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete(&self, ids: &[String]) -> Result<(), MemoryError> {
        if ids.is_empty() {
            return Ok(());
        }
        let request = DeleteRequest { ids: ids.to_vec() };
        self.post("/vectors/delete", &request).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, vector, filter), fields(top_k = top_k))]
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &FactFilter,
    ) -> Result<Vec<ScoredFact>, MemoryError> {
        let request = QueryRequest {
            vector: vector.to_vec(),
            top_k,
            filter: filter_json(filter),
            include_metadata: true,
        };

        let body: QueryResponse = self
            .post("/query", &request)
            .await?
            .json()
            .await
            .map_err(|e| MemoryError::Index(format!("invalid query response: {e}")))?;

        Ok(body
            .matches
            .into_iter()
            .map(|m| ScoredFact {
                id: m.id,
                score: m.score,
                attributes: m.metadata,
            })
            .collect())
    }
}

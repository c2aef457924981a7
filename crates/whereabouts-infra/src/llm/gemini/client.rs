//! GeminiClient -- concrete [`Inference`] and [`Embedder`] implementation
//! for the Gemini API.
//!
//! One HTTP client serves both concerns: `generateContent` for prompt
//! inference and intent classification (function calling), and
//! `batchEmbedContents` for embeddings.
//!
//! The API key is wrapped in [`secrecy::SecretString`], sent only via the
//! `x-goog-api-key` header, and never logged or included in Debug output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use whereabouts_core::inference::{CapabilityDecl, Inference, IntentCall};
use whereabouts_core::memory::Embedder;
use whereabouts_core::prompt::PromptTemplate;
use whereabouts_types::error::MemoryError;

use super::types::{
    BatchEmbedRequest, BatchEmbedResponse, Content, EmbedContentRequest, FunctionDeclaration,
    GenerateRequest, GenerateResponse, GenerationConfig, Tool,
};

/// Gemini API client.
///
/// Implements [`Inference`] over `generateContent` and [`Embedder`] over
/// `batchEmbedContents`. `Clone` is cheap (shared reqwest pool) and lets
/// one configured client back both ports.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    embedding_model: String,
    dimension: usize,
}

// GeminiClient intentionally does not derive Debug; the SecretString field
// already shields the key, and omitting Debug removes the temptation to
// log the client wholesale.

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// `dimension` must match the vector index's configured dimension.
    pub fn new(api_key: SecretString, embedding_model: String, dimension: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            embedding_model,
            dimension,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, MemoryError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| MemoryError::Inference(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MemoryError::Inference(format!(
                "gemini returned {status}: {}",
                snippet(&body)
            )));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| MemoryError::Inference(format!("invalid response body: {e}")))
    }

    /// The first text part of the first candidate, if any.
    fn first_text(response: &GenerateResponse) -> Option<&str> {
        response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.iter().find_map(|p| p.text.as_deref()))
    }
}

impl Inference for GeminiClient {
    #[tracing::instrument(skip(self, vars), fields(prompt = prompt.name, model = model))]
    async fn infer(
        &self,
        model: &str,
        prompt: &PromptTemplate,
        vars: &Value,
    ) -> Result<Value, MemoryError> {
        let request = GenerateRequest {
            system_instruction: Some(Content::text(None, prompt.system)),
            contents: vec![Content::text(Some("user"), prompt.render(vars))],
            tools: None,
            generation_config: Some(GenerationConfig {
                temperature: 0.0,
                response_mime_type: Some("application/json".to_string()),
            }),
        };

        let response = self.generate(model, &request).await?;
        let text = Self::first_text(&response).ok_or_else(|| {
            MemoryError::Inference(format!("{} produced no text candidate", prompt.name))
        })?;

        serde_json::from_str(strip_code_fence(text)).map_err(|e| {
            MemoryError::Inference(format!("{} returned malformed JSON: {e}", prompt.name))
        })
    }

    #[tracing::instrument(skip(self, utterance, capabilities), fields(model = model))]
    async fn classify(
        &self,
        model: &str,
        utterance: &str,
        capabilities: &[CapabilityDecl],
    ) -> Result<Option<IntentCall>, MemoryError> {
        let declarations = capabilities
            .iter()
            .map(|c| FunctionDeclaration {
                name: c.name.to_string(),
                description: c.description.to_string(),
                parameters: c.parameters.clone(),
            })
            .collect();

        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content::text(Some("user"), utterance)],
            tools: Some(vec![Tool {
                function_declarations: declarations,
            }]),
            generation_config: None,
        };

        let response = self.generate(model, &request).await?;
        let call = response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| {
                content
                    .parts
                    .iter()
                    .find_map(|p| p.function_call.as_ref())
            })
            .map(|fc| IntentCall {
                name: fc.name.clone(),
                args: fc.args.clone(),
            });

        Ok(call)
    }
}

impl Embedder for GeminiClient {
    #[tracing::instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = format!("models/{}", self.embedding_model);
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: model.clone(),
                    content: Content::text(None, text.clone()),
                })
                .collect(),
        };

        let url = format!(
            "{}/models/{}:batchEmbedContents",
            self.base_url, self.embedding_model
        );
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| MemoryError::Embedding(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MemoryError::Embedding(format!(
                "gemini returned {status}: {}",
                snippet(&body)
            )));
        }

        let body: BatchEmbedResponse = response
            .json()
            .await
            .map_err(|e| MemoryError::Embedding(format!("invalid response body: {e}")))?;

        if body.embeddings.len() != texts.len() {
            return Err(MemoryError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.embeddings.len()
            )));
        }

        Ok(body.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn model_name(&self) -> &str {
        &self.embedding_model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Strip a markdown code fence around a JSON payload, if present. Gemini
/// occasionally wraps JSON-mode output even with the mime type pinned.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// First line of an error body, bounded, for log-safe error messages.
fn snippet(body: &str) -> &str {
    let line = body.lines().next().unwrap_or_default();
    match line.char_indices().nth(200) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

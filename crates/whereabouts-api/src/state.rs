//! Application state wiring the collaborator clients into the memory
//! service.
//!
//! The service is generic over the collaborator ports; state pins them to
//! the concrete infra implementations and selects the index backend at
//! runtime via the Box wrappers.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use whereabouts_core::inference::BoxInference;
use whereabouts_core::memory::{BoxEmbedder, BoxFactIndex};
use whereabouts_core::service::{MemoryService, ServiceModels};
use whereabouts_infra::config::{load_credentials, load_settings};
use whereabouts_infra::llm::gemini::GeminiClient;
use whereabouts_infra::vector::{MemoryFactIndex, PineconeIndex};
use whereabouts_types::config::{IndexBackend, Settings};

/// Shared application state for the REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub memory_service: Arc<MemoryService>,
    pub settings: Settings,
}

impl AppState {
    /// Load settings and credentials, then wire the service.
    pub async fn init() -> anyhow::Result<Self> {
        let settings = load_settings(Path::new(".")).await;
        let credentials = load_credentials()?;

        let gemini = GeminiClient::new(
            credentials.gemini_api_key,
            settings.embedding_model.clone(),
            settings.index_dimension,
        );
        let inference = BoxInference::new(gemini.clone());
        let embedder = BoxEmbedder::new(gemini);

        let index = match settings.index_backend {
            IndexBackend::Pinecone => {
                let api_key = credentials
                    .pinecone_api_key
                    .context("PINECONE_API_KEY is not set")?;
                let host = settings
                    .index_host
                    .clone()
                    .context("index_host must be set for the pinecone backend")?;
                BoxFactIndex::new(PineconeIndex::new(api_key, host))
            }
            IndexBackend::Memory => {
                tracing::warn!("using in-memory index; facts will not survive restarts");
                BoxFactIndex::new(MemoryFactIndex::new())
            }
        };

        let models = ServiceModels {
            generation: settings.generation_model.clone(),
            retrieval: settings.retrieval_model.clone(),
        };
        let memory_service = MemoryService::new(inference, embedder, index, models);

        Ok(Self {
            memory_service: Arc::new(memory_service),
            settings,
        })
    }
}

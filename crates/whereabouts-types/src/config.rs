//! Service configuration.
//!
//! `Settings` deserializes from `config.toml` with every field defaulted,
//! so a missing or partial file still yields a runnable configuration.
//! API keys are never part of this struct; they come from the environment
//! (see the infra loader).

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Which vector index backend to use at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// In-process index; data is lost on restart. Default, needs no keys.
    Memory,
    /// Remote Pinecone index over its data-plane HTTP API.
    Pinecone,
}

impl Default for IndexBackend {
    fn default() -> Self {
        IndexBackend::Memory
    }
}

impl fmt::Display for IndexBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexBackend::Memory => write!(f, "memory"),
            IndexBackend::Pinecone => write!(f, "pinecone"),
        }
    }
}

impl FromStr for IndexBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(IndexBackend::Memory),
            "pinecone" => Ok(IndexBackend::Pinecone),
            other => Err(format!("invalid index backend: '{other}'")),
        }
    }
}

/// Global service settings, loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vector index name.
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Embedding dimensionality; must match the index's configured
    /// dimension.
    #[serde(default = "default_index_dimension")]
    pub index_dimension: usize,

    /// Which index backend to run against.
    #[serde(default)]
    pub index_backend: IndexBackend,

    /// Base URL of the remote index (required for the pinecone backend).
    #[serde(default)]
    pub index_host: Option<String>,

    /// Model used for prompt-driven generation (segmentation, extraction,
    /// response composition) and intent classification.
    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    /// Model used for retrieval-query classification.
    #[serde(default = "default_retrieval_model")]
    pub retrieval_model: String,

    /// Embedding model.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

fn default_index_name() -> String {
    "whereabouts-index".to_string()
}

fn default_index_dimension() -> usize {
    3072
}

fn default_generation_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_retrieval_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_embedding_model() -> String {
    "gemini-embedding-exp-03-07".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index_name: default_index_name(),
            index_dimension: default_index_dimension(),
            index_backend: IndexBackend::default(),
            index_host: None,
            generation_model: default_generation_model(),
            retrieval_model: default_retrieval_model(),
            embedding_model: default_embedding_model(),
        }
    }
}

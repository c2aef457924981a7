//! Gemini client: language understanding and embeddings over one HTTP
//! client.

mod client;
mod types;

pub use client::GeminiClient;

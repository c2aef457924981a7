//! Vector index backends.
//!
//! `PineconeIndex` talks to a remote Pinecone index over its data-plane
//! HTTP API; `MemoryFactIndex` is an in-process cosine-similarity index
//! for tests and local runs. Both implement `FactIndex` from
//! whereabouts-core.

pub mod memory;
pub mod pinecone;

pub use memory::MemoryFactIndex;
pub use pinecone::PineconeIndex;

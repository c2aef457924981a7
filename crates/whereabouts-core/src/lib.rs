//! Memory reconciliation engine for Whereabouts.
//!
//! This crate holds the algorithmic heart of the service and the "ports"
//! (collaborator traits) the infrastructure layer implements: language
//! understanding, embeddings, and the vector index. It depends only on
//! `whereabouts-types` -- never on `whereabouts-infra` or any HTTP/IO crate.
//!
//! Pipeline shape: an utterance is classified into one of the memory
//! operations (`intent`), decomposed into one-fact sentences (`segmenter`),
//! reduced to (location, item) pairs (`extractor`), reconciled against the
//! facts already stored for that owner (`reconcile` + `matcher`), and
//! finally fanned out / aggregated per target (`batch`). `service` wires
//! these into the four public operations.

pub mod batch;
pub mod extractor;
pub mod inference;
pub mod intent;
pub mod matcher;
pub mod memory;
pub mod prompt;
pub mod reconcile;
pub mod segmenter;
pub mod service;
pub mod text;

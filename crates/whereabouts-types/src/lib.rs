//! Shared domain types for Whereabouts.
//!
//! This crate contains the core domain types used across the Whereabouts
//! service: memory facts, index records, query request/response bodies,
//! configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod fact;
pub mod query;

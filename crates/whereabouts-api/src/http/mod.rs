//! HTTP/REST API layer for Whereabouts.
//!
//! Axum-based API with permissive CORS and a flat `{status, ...}` body
//! shape on both errors and status responses.

pub mod error;
pub mod handlers;
pub mod router;

//! Vehicle taxonomy ingestion and reconciliation.
//!
//! Turns a flat Make/Model/Variant CSV stream into the normalized
//! make -> model -> variant hierarchy persisted in the shared store:
//! - CSV row parsing and validation ([`parser`])
//! - in-memory aggregation ([`tree`])
//! - chunked concurrent dispatch of store writes ([`batch`])
//! - the three-phase reconciliation engine ([`reconcile`])
//!
//! Every write is an idempotent upsert keyed on a unique natural key,
//! so re-running the pipeline against the same input converges to the
//! same persisted state without duplicates.

pub mod batch;
pub mod db;
pub mod parser;
pub mod reconcile;
pub mod tree;

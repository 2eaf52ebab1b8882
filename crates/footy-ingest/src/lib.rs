//! League ingestion for footy.
//!
//! Wires the credential client, the football data collector and a
//! [`RecordStore`](footy_core::store::RecordStore) into a single sequential
//! run: secret → country id → leagues → schema → upserts.

pub mod config;
pub mod error;
pub mod pipeline;

pub use crate::{
  config::IngestConfig,
  error::{Error, Result},
  pipeline::{Pipeline, RunOutcome, RunSummary},
};

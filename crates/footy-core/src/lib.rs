//! Core types and trait definitions for the footy ingestion pipeline.
//!
//! This crate is free of HTTP and database dependencies. Records flow in from
//! the collector, schemas are inferred here, and storage backends implement
//! [`store::RecordStore`].

pub mod error;
pub mod record;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
pub use record::{Record, RecordSet, Scalar};
pub use schema::{ColumnType, TableSchema, infer_schema};

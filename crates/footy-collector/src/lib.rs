//! Client for the football data API.
//!
//! Looks up a country's identifier and lists its leagues, handing the
//! leagues back as a [`footy_core::RecordSet`] ready for schema inference.

mod client;
mod model;

pub mod error;

pub use client::{Collector, CollectorConfig};
pub use error::{Error, Result};
pub use model::{Country, League};

/// Base URL of the football data API.
pub const DEFAULT_BASE_URL: &str = "https://apiv3.apifootball.com/";

/// Primary-key column for league records.
pub const LEAGUE_ID: &str = "league_id";

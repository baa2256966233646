//! # Trademark Harvester
//!
//! Retrieves the full trademark register from the Patentstyret open-data API
//! one page at a time, detecting records that reappear across pages.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Page and record data structures, identifier extraction
//! - [`api`]: The registry API client and fetch-outcome classification
//! - [`harvest`]: The pagination driver and duplicate tracker
//! - [`utils`]: HTTP client construction and retry/backoff logic
//! - [`config`]: Configuration management

pub mod api;
pub mod config;
pub mod harvest;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use api::{FetchOutcome, HarvestError, PageSource, TrademarkApi};
pub use harvest::{HarvestSummary, Harvester, StopReason};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

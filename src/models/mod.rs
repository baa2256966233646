//! Core data models for registry pages and trademark records.

mod page;
mod record;

pub use page::SearchPage;
pub use record::record_identifier;

//! One page of search results from the registry API.

use serde::Deserialize;
use serde_json::Value;

/// A single page of the paginated `/search/json` response.
///
/// Records are kept as opaque JSON documents; the harvester only derives an
/// identifier from them and compares them structurally.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Total number of records the registry reports for the query
    #[serde(default)]
    pub total_hits_count: u64,
    /// Zero-based page number echoed back by the API
    pub page_number: u32,
    /// Requested page size echoed back by the API
    pub page_size: u32,
    /// Records on this page, in API order
    #[serde(default)]
    pub results: Vec<Value>,
}

impl SearchPage {
    /// A full page suggests more data may follow; a short or empty page is
    /// the end of the corpus.
    pub fn maybe_has_next(&self) -> bool {
        !self.results.is_empty() && self.results.len() == self.page_size as usize
    }

    pub fn next_page_number(&self) -> u32 {
        self.page_number + 1
    }
}

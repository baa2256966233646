//! Cross-page duplicate tracking keyed by record identifier.

use serde_json::Value;
use std::collections::HashMap;

use crate::api::HarvestError;
use crate::models::{record_identifier, SearchPage};

/// The most recently seen version of a record and where it appeared.
#[derive(Debug)]
struct SeenRecord {
    document: Value,
    page: u32,
}

/// One identifier sighted on more than one occasion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateReport {
    pub id: String,
    pub previous_page: u32,
    pub current_page: u32,
    /// Whether the two sightings carried structurally identical documents
    pub identical: bool,
}

/// Tracks every record identifier seen during a run.
///
/// The API should return each record exactly once; identifiers that reappear
/// on later pages are counted, and the stored document is compared
/// structurally so content drift between sightings is visible in the logs.
#[derive(Debug, Default)]
pub struct DuplicateTracker {
    seen: HashMap<String, SeenRecord>,
    reports: Vec<DuplicateReport>,
    records_seen: u64,
    verbose: bool,
}

impl DuplicateTracker {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    /// Walk the page's records in order, counting identifiers seen before.
    ///
    /// Returns the cumulative duplicate count. A record the identifier cannot
    /// be extracted from fails the whole page.
    pub fn process(&mut self, page: &SearchPage) -> Result<u32, HarvestError> {
        tracing::info!(
            page = page.page_number,
            records = page.results.len(),
            "page documents (applicationNumber/registrationNumber)"
        );

        for document in &page.results {
            let id = record_identifier(document)?;
            self.records_seen += 1;
            tracing::info!("  {id}");

            if let Some(previous) = self.seen.get(&id) {
                let report = DuplicateReport {
                    id: id.clone(),
                    previous_page: previous.page,
                    current_page: page.page_number,
                    identical: previous.document == *document,
                };
                tracing::warn!(
                    %id,
                    previous_page = report.previous_page,
                    current_page = report.current_page,
                    identical = report.identical,
                    "document already processed"
                );
                if self.verbose {
                    tracing::warn!("Current: {}", pretty(document));
                    tracing::warn!("Previous: {}", pretty(&previous.document));
                }
                self.reports.push(report);
            }

            // Last write wins; the earlier sighting stays visible through the
            // duplicate log above.
            self.seen.insert(
                id,
                SeenRecord {
                    document: document.clone(),
                    page: page.page_number,
                },
            );
        }

        Ok(self.duplicates())
    }

    /// Cumulative duplicates observed this run
    pub fn duplicates(&self) -> u32 {
        self.reports.len() as u32
    }

    /// One report per duplicate sighting, in observation order
    pub fn reports(&self) -> &[DuplicateReport] {
        &self.reports
    }

    /// Total records walked this run, duplicates included
    pub fn records_seen(&self) -> u64 {
        self.records_seen
    }
}

fn pretty(document: &Value) -> String {
    serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string())
}

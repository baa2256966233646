//! The pagination driver: fetches the register page by page until one of the
//! stop conditions is met.

mod dedup;

pub use dedup::{DuplicateReport, DuplicateTracker};

use std::fmt;

use crate::api::{HarvestError, PageSource};
use crate::utils::{run_with_retry, RetryPolicy};

/// Why a harvest run ended.
///
/// All three are clean terminations; failures surface as [`HarvestError`]
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// An empty or short page: the corpus is exhausted
    EndOfData,
    /// The page-number cap was reached while pages were still full
    PageCap,
    /// More duplicates than plausible for a well-behaved API
    DuplicateThreshold,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EndOfData => write!(f, "end-of-data"),
            StopReason::PageCap => write!(f, "page-cap"),
            StopReason::DuplicateThreshold => write!(f, "duplicate-threshold"),
        }
    }
}

/// Caps that bound a run independently of the corpus size.
#[derive(Debug, Clone, Copy)]
pub struct HarvestLimits {
    /// Highest page number processed before stopping
    pub page_cap: u32,
    /// Duplicate count above which the run is abandoned
    pub duplicate_threshold: u32,
}

impl Default for HarvestLimits {
    fn default() -> Self {
        Self {
            page_cap: 500,
            duplicate_threshold: 100,
        }
    }
}

/// What a completed run saw.
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    pub total_hits: u64,
    pub pages_processed: u32,
    pub records_seen: u64,
    pub duplicates: u32,
    pub reason: StopReason,
}

/// Drives the fetch loop: one page at a time, each page resolved (including
/// its retries) before the next is requested.
pub struct Harvester<S> {
    source: S,
    policy: RetryPolicy,
    limits: HarvestLimits,
    tracker: DuplicateTracker,
}

impl<S: PageSource> Harvester<S> {
    pub fn new(source: S, policy: RetryPolicy, limits: HarvestLimits, verbose: bool) -> Self {
        Self {
            source,
            policy,
            limits,
            tracker: DuplicateTracker::new(verbose),
        }
    }

    /// Harvest from page 0 until a stop condition is met.
    ///
    /// Any non-retryable failure aborts the run; there is no partial-success
    /// return beyond what has already been logged.
    pub async fn run(&mut self) -> Result<HarvestSummary, HarvestError> {
        let mut page = run_with_retry(&self.policy, 0, || self.source.fetch(0)).await?;
        tracing::info!(total_hits = page.total_hits_count, "total number of hits");
        let total_hits = page.total_hits_count;

        let mut pages_processed: u32 = 0;
        let reason = loop {
            let duplicates = self.tracker.process(&page)?;
            pages_processed += 1;

            // Stop checks in priority order
            if !page.maybe_has_next() {
                break StopReason::EndOfData;
            }
            if page.page_number > self.limits.page_cap {
                break StopReason::PageCap;
            }
            if duplicates > self.limits.duplicate_threshold {
                break StopReason::DuplicateThreshold;
            }

            let next = page.next_page_number();
            page = run_with_retry(&self.policy, next, || self.source.fetch(next)).await?;
        };

        match reason {
            StopReason::EndOfData => {
                tracing::info!(pages = pages_processed, "reached the end of the register");
            }
            StopReason::PageCap => {
                tracing::info!(
                    pages = pages_processed,
                    cap = self.limits.page_cap,
                    "processed more pages than the cap, stopping"
                );
            }
            StopReason::DuplicateThreshold => {
                tracing::error!(
                    duplicates = self.tracker.duplicates(),
                    threshold = self.limits.duplicate_threshold,
                    "observed more duplicates than the threshold, stopping"
                );
            }
        }

        Ok(HarvestSummary {
            total_hits,
            pages_processed,
            records_seen: self.tracker.records_seen(),
            duplicates: self.tracker.duplicates(),
            reason,
        })
    }
}

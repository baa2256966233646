//! Registry API client and fetch-outcome classification.
//!
//! A page fetch never fails directly; it is classified into a [`FetchOutcome`]
//! so the retry layer can decide what is worth re-issuing. Only conditions
//! that end the whole run surface as a [`HarvestError`].

mod trademarks;

pub use trademarks::{TrademarkApi, DEFAULT_BASE_URL};

use async_trait::async_trait;
use std::time::Duration;

use crate::models::SearchPage;

/// Classification of a single page request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// 200 with a parsable page body
    Success(SearchPage),
    /// 429; the server-provided `Retry-After` interval
    RateLimited { retry_after: Duration },
    /// 401; never retried
    Unauthorized(String),
    /// Transport failure or unexpected status; worth re-issuing
    Retryable(String),
    /// The response cannot be acted on (unparsable body or headers)
    Fatal(String),
}

/// Errors that terminate a harvest run.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// The API rejected the subscription key
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A response that cannot be interpreted (bad 200 body, bad Retry-After)
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A record is missing the fields its identifier is built from
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The retry budget ran out; carries the last retryable cause
    #[error("Retries exhausted for page {page} after {attempts} attempts: {last}")]
    RetriesExhausted {
        page: u32,
        attempts: u32,
        last: String,
    },
}

/// A source of registry pages.
///
/// [`TrademarkApi`] is the production implementation; tests drive the
/// harvester with scripted sources.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Request one page and classify the result
    async fn fetch(&self, page_number: u32) -> FetchOutcome;
}

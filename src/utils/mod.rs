//! Utility modules supporting the harvest workflow:
//!
//! - [`HttpClient`]: shared reqwest client with the registry's timeout profile
//! - [`RetryPolicy`] / [`run_with_retry`]: bounded retry with exponential and
//!   rate-limit-aware backoff

mod http;
mod retry;

pub use http::HttpClient;
pub use retry::{run_with_retry, RetryPolicy};

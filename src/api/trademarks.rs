//! Patentstyret trademark open-data API client.

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;

use crate::api::{FetchOutcome, PageSource};
use crate::models::SearchPage;
use crate::utils::HttpClient;

/// Default base URL for the trademark register
pub const DEFAULT_BASE_URL: &str =
    "https://api.patentstyret.no/external/opendata/register/Trademark/v1";

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const APPLICATION_DATE_FROM: &str = "0001-01-01";
const PAGE_SIZE: u32 = 50;

/// Client for the registry search endpoint.
///
/// Issues one `POST <base>/search/json` per page and classifies the raw
/// response into a [`FetchOutcome`]; retry decisions live in
/// [`crate::utils::run_with_retry`].
#[derive(Debug, Clone)]
pub struct TrademarkApi {
    client: HttpClient,
    base_url: String,
    api_key: String,
}

impl TrademarkApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: HttpClient::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn fetch_page(&self, page_number: u32) -> FetchOutcome {
        let url = format!("{}/search/json", self.base_url);
        let body = serde_json::json!({
            "applicationDateFrom": APPLICATION_DATE_FROM,
            "pageSize": PAGE_SIZE,
            "pageNumber": page_number,
        });
        tracing::debug!(%url, %body, "requesting page");

        let response = match self
            .client
            .client()
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Retryable(format!("request failed: {e}")),
        };

        match response.status() {
            StatusCode::OK => match response.json::<SearchPage>().await {
                Ok(page) => FetchOutcome::Success(page),
                Err(e) => FetchOutcome::Fatal(format!("unparsable page body: {e}")),
            },
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.trim().parse::<u64>().ok());
                match retry_after {
                    Some(seconds) => FetchOutcome::RateLimited {
                        retry_after: Duration::from_secs(seconds),
                    },
                    None => FetchOutcome::Fatal(
                        "429 response without a parsable Retry-After header".to_string(),
                    ),
                }
            }
            StatusCode::UNAUTHORIZED => {
                FetchOutcome::Unauthorized(response.text().await.unwrap_or_default())
            }
            status => FetchOutcome::Retryable(format!(
                "API returned status {status}: {}",
                response.text().await.unwrap_or_default()
            )),
        }
    }
}

#[async_trait]
impl PageSource for TrademarkApi {
    async fn fetch(&self, page_number: u32) -> FetchOutcome {
        self.fetch_page(page_number).await
    }
}

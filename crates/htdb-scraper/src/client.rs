//! HTTP fetcher for the review site's JSON API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::ScraperError;
use crate::fetch::Fetcher;
use crate::retry::retry_with_backoff;

/// HTTP client for the review site.
///
/// Handles rate limiting (429), not-found (404), and other non-2xx responses
/// as typed errors. Transient errors (429, network failures) are
/// automatically retried with exponential backoff up to `max_retries`
/// additional attempts; the engine's per-job retry sits above this layer.
pub struct HttpFetcher {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl HttpFetcher {
    /// Creates an `HttpFetcher` with configured timeout, `User-Agent`, and
    /// retry policy. `max_retries` is the number of additional attempts after
    /// the first failure for retriable errors; set to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "application/json,text/html;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);

            return Err(ScraperError::RateLimited {
                domain: extract_domain(url),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            self.fetch_once(url)
        })
        .await
    }
}

/// Builds a listing page URL: `{base}{endpoint}?offset=N&count=M`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidBaseUrl`] if `base` does not parse as a URL
/// base.
pub fn listing_url(
    base: &str,
    endpoint: &str,
    offset: u64,
    count: u64,
) -> Result<String, ScraperError> {
    let mut url = join_base(base, endpoint)?;
    url.query_pairs_mut()
        .append_pair("offset", &offset.to_string())
        .append_pair("count", &count.to_string());
    Ok(url.to_string())
}

/// Builds a brand detail URL: `{base}/api/brands/{slug}`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidBaseUrl`] if `base` does not parse.
pub fn brand_detail_url(base: &str, slug: &str) -> Result<String, ScraperError> {
    Ok(join_base(base, &format!("/api/brands/{slug}"))?.to_string())
}

/// Builds a product detail URL: `{base}/api/brands/{brand}/products/{slug}`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidBaseUrl`] if `base` does not parse.
pub fn product_detail_url(
    base: &str,
    brand_slug: &str,
    slug: &str,
) -> Result<String, ScraperError> {
    Ok(join_base(base, &format!("/api/brands/{brand_slug}/products/{slug}"))?.to_string())
}

/// Listing endpoint path for the brand catalog.
#[must_use]
pub fn brands_endpoint() -> String {
    "/api/brands".to_string()
}

/// Listing endpoint path for one brand's products.
#[must_use]
pub fn products_endpoint(brand_slug: &str) -> String {
    format!("/api/brands/{brand_slug}/products")
}

fn join_base(base: &str, path: &str) -> Result<Url, ScraperError> {
    let trimmed = base.trim_end_matches('/');
    Url::parse(&format!("{trimmed}{path}")).map_err(|e| ScraperError::InvalidBaseUrl {
        base_url: base.to_owned(),
        reason: e.to_string(),
    })
}

/// Extracts the bare domain from a URL for rate-limit reporting.
fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

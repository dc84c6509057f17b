use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("parse error for {identifier}: {reason}")]
    Parse { identifier: String, reason: String },

    #[error("validation failed for {identifier}: {errors:?}")]
    Validation {
        identifier: String,
        errors: Vec<String>,
    },

    #[error("parent brand '{brand_slug}' not found in storage for product '{product_slug}'")]
    MissingParentBrand {
        brand_slug: String,
        product_slug: String,
    },

    #[error("pagination limit reached for {endpoint}: exceeded {max_pages} pages")]
    PaginationLimit { endpoint: String, max_pages: usize },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("storage error: {0}")]
    Store(#[from] htdb_core::StoreError),

    #[error("operation cancelled")]
    Cancelled,
}

impl ScraperError {
    /// Pipeline stage an error belongs to, for `{stage, identifier}` log
    /// context at the extraction boundary.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            ScraperError::Http(_)
            | ScraperError::RateLimited { .. }
            | ScraperError::NotFound { .. }
            | ScraperError::UnexpectedStatus { .. } => "fetch",
            ScraperError::Deserialize { .. } | ScraperError::Parse { .. } => "parse",
            ScraperError::Validation { .. } => "validate",
            ScraperError::MissingParentBrand { .. } | ScraperError::Store(_) => "persist",
            ScraperError::PaginationLimit { .. } => "discover",
            ScraperError::InvalidBaseUrl { .. } => "configure",
            ScraperError::Cancelled => "cancel",
        }
    }
}

//! Review-site API response types.
//!
//! ## Observed shape from the live site
//!
//! Listing endpoints (`/api/brands`, `/api/brands/{slug}/products`) accept
//! `offset`/`count` query parameters and return:
//!
//! ```json
//! {
//!   "items": [{"name": "Al Fakher", "url": "/brands/al-fakher", "image": "..."}],
//!   "offset": 0,
//!   "count": 25,
//!   "totalCount": 312,
//!   "hasMore": true
//! }
//! ```
//!
//! `totalCount` is occasionally missing on very old cached pages; `offset`
//! and `count` echo the request. When a client pages past the end the site
//! does not 404 — it returns a page whose body contains the literal string
//! `"No more results"` (sometimes with `hasMore` still `true`, which is why
//! the sentinel wins over the flag).
//!
//! Detail endpoints (`/api/brands/{slug}`,
//! `/api/brands/{brand}/products/{slug}`) return a single object with
//! `name`, `description`, `image`, and `url`. `url` may be relative and may
//! carry tracking parameters the site appends to outbound listing links.

use serde::Deserialize;

/// Body marker the site emits once a listing is exhausted. Checked against
/// the raw page content before any JSON parsing.
pub const NO_MORE_RESULTS_SENTINEL: &str = "No more results";

/// One entry from a listing page; enough to identify an item for the
/// extraction queue without fetching its detail page.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ListingItem {
    pub name: String,
    /// Detail-page URL, possibly relative to the site root.
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// One page from a listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListingResponse {
    #[serde(default)]
    pub items: Vec<ListingItem>,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub count: u64,
    /// Absent on some cached pages; pagination then stops at `hasMore`.
    #[serde(default, rename = "totalCount")]
    pub total_count: Option<u64>,
    #[serde(default, rename = "hasMore")]
    pub has_more: bool,
}

/// Raw brand detail record, before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBrand {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Raw product detail record, before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

//! Parse collaborator seam and the site's JSON implementation.

use crate::error::ScraperError;
use crate::pagination::PageCursor;
use crate::types::{
    ListingItem, ListingResponse, RawBrand, RawProduct, NO_MORE_RESULTS_SENTINEL,
};

/// One parsed listing page.
#[derive(Debug)]
pub struct ListingPage {
    pub items: Vec<ListingItem>,
    pub has_more: bool,
    /// Present when the page carried enough position data to paginate.
    pub cursor: Option<PageCursor>,
}

/// Turns raw page content into structured records.
///
/// The engine drives this trait only; swapping the site's JSON API for an
/// HTML scrape means providing another implementation, not touching the
/// orchestration.
pub trait CatalogParser: Send + Sync {
    /// Parses one brand-listing page. `endpoint` is echoed into the cursor.
    fn parse_brand_list(&self, body: &str, endpoint: &str) -> Result<ListingPage, ScraperError>;

    /// Parses one product-listing page for a brand.
    fn parse_product_list(&self, body: &str, endpoint: &str) -> Result<ListingPage, ScraperError>;

    /// Parses a brand detail page.
    fn parse_brand_detail(&self, body: &str, slug: &str) -> Result<RawBrand, ScraperError>;

    /// Parses a product detail page.
    fn parse_product_detail(
        &self,
        body: &str,
        slug: &str,
        brand_slug: &str,
    ) -> Result<RawProduct, ScraperError>;

    /// Content-level completion sentinel. When this returns `true` the
    /// discovery loop stops regardless of what `has_more` claims.
    fn is_discovery_complete(&self, body: &str) -> bool;
}

/// Parser for the review site's JSON API responses.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCatalogParser;

impl JsonCatalogParser {
    fn parse_listing(body: &str, endpoint: &str) -> Result<ListingPage, ScraperError> {
        let response =
            serde_json::from_str::<ListingResponse>(body).map_err(|e| ScraperError::Deserialize {
                context: format!("listing page from {endpoint}"),
                source: e,
            })?;

        // Without a totalCount there is nothing to advance against; the page
        // still yields items but pagination stops at has_more.
        let cursor = response
            .total_count
            .map(|total| PageCursor::new(endpoint, response.offset, response.count, total));

        Ok(ListingPage {
            items: response.items,
            has_more: response.has_more,
            cursor,
        })
    }
}

impl CatalogParser for JsonCatalogParser {
    fn parse_brand_list(&self, body: &str, endpoint: &str) -> Result<ListingPage, ScraperError> {
        Self::parse_listing(body, endpoint)
    }

    fn parse_product_list(&self, body: &str, endpoint: &str) -> Result<ListingPage, ScraperError> {
        Self::parse_listing(body, endpoint)
    }

    fn parse_brand_detail(&self, body: &str, slug: &str) -> Result<RawBrand, ScraperError> {
        serde_json::from_str::<RawBrand>(body).map_err(|e| ScraperError::Deserialize {
            context: format!("brand detail for '{slug}'"),
            source: e,
        })
    }

    fn parse_product_detail(
        &self,
        body: &str,
        slug: &str,
        brand_slug: &str,
    ) -> Result<RawProduct, ScraperError> {
        serde_json::from_str::<RawProduct>(body).map_err(|e| ScraperError::Deserialize {
            context: format!("product detail for '{brand_slug}/{slug}'"),
            source: e,
        })
    }

    fn is_discovery_complete(&self, body: &str) -> bool {
        body.contains(NO_MORE_RESULTS_SENTINEL)
    }
}

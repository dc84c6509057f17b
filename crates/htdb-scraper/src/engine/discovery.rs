//! Paginated listing discovery.
//!
//! Both brand and product discovery walk the same offset/count loop: fetch a
//! listing page, check the completion sentinel, parse items, de-duplicate
//! within the walk, advance the cursor by the number of items actually
//! returned. A first-page failure aborts; later-page failures end the walk
//! with whatever was collected so far.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::client;
use crate::engine::{lock, ScraperEngine};
use crate::error::ScraperError;
use crate::pagination::MAX_PAGES;
use crate::parse::ListingPage;
use crate::types::ListingItem;

/// Which counter a discovery walk feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListingKind {
    Brands,
    Products,
}

impl ScraperEngine {
    /// Walks the brand listing from offset 0 until exhaustion.
    ///
    /// # Errors
    ///
    /// Fails when the very first page cannot be fetched or parsed, or when
    /// the walk exceeds [`MAX_PAGES`] without terminating.
    pub async fn discover_brands(&self) -> Result<Vec<ListingItem>, ScraperError> {
        let endpoint = client::brands_endpoint();
        self.discover_listing(&endpoint, ListingKind::Brands).await
    }

    /// Walks one brand's product listing from offset 0 until exhaustion.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ScraperEngine::discover_brands`].
    pub async fn discover_products(
        &self,
        brand_slug: &str,
    ) -> Result<Vec<ListingItem>, ScraperError> {
        let endpoint = client::products_endpoint(brand_slug);
        self.discover_listing(&endpoint, ListingKind::Products).await
    }

    async fn discover_listing(
        &self,
        endpoint: &str,
        kind: ListingKind,
    ) -> Result<Vec<ListingItem>, ScraperError> {
        let mut discovered: Vec<ListingItem> = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut offset: u64 = 0;
        let count = self.config.page_size;
        let mut pages: usize = 0;

        loop {
            if self.is_cancelled() {
                warn!(endpoint, "cancellation requested — stopping discovery");
                break;
            }

            pages += 1;
            if pages > MAX_PAGES {
                return Err(ScraperError::PaginationLimit {
                    endpoint: endpoint.to_string(),
                    max_pages: MAX_PAGES,
                });
            }

            let first_page = pages == 1;
            if !first_page && self.config.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.inter_request_delay_ms))
                    .await;
            }

            let url = client::listing_url(&self.config.base_url, endpoint, offset, count)?;
            let body = match self.fetcher.fetch(&url).await {
                Ok(body) => body,
                Err(e) if first_page => return Err(e),
                Err(e) => {
                    warn!(
                        endpoint,
                        offset,
                        error = %e,
                        collected = discovered.len(),
                        "listing fetch failed mid-walk — keeping partial results"
                    );
                    break;
                }
            };

            if self.parser.is_discovery_complete(&body) {
                debug!(endpoint, offset, "completion sentinel seen — discovery done");
                break;
            }

            let mut page = match self.parse_listing(kind, &body, endpoint) {
                Ok(page) => page,
                Err(e) if first_page => return Err(e),
                Err(e) => {
                    warn!(
                        endpoint,
                        offset,
                        error = %e,
                        collected = discovered.len(),
                        "listing parse failed mid-walk — keeping partial results"
                    );
                    break;
                }
            };

            let items = std::mem::take(&mut page.items);
            let returned = items.len() as u64;
            let mut new_items: u64 = 0;
            for item in items {
                let key = item.url.trim().to_lowercase();
                if seen_urls.insert(key) {
                    new_items += 1;
                    discovered.push(item);
                }
            }

            let (iteration, should_checkpoint) = {
                let mut counters = lock(&self.counters);
                counters.iteration += 1;
                match kind {
                    ListingKind::Brands => counters.brands_discovered += new_items,
                    ListingKind::Products => counters.products_discovered += new_items,
                }
                let interval = self.config.checkpoint_interval;
                (
                    counters.iteration,
                    interval > 0 && counters.iteration % interval == 0,
                )
            };

            if let Some(cursor) = &page.cursor {
                debug!(
                    endpoint,
                    offset = cursor.offset,
                    total = cursor.total_count,
                    percent = format!("{:.1}", cursor.percent_complete()),
                    "listing page processed"
                );
                lock(&self.cursors).insert(endpoint.to_string(), cursor.clone());
            } else {
                debug!(endpoint, offset, returned, "listing page processed (no cursor)");
            }

            if should_checkpoint {
                self.emit_checkpoint();
            }

            if !self.page_has_next(&page, returned) {
                info!(
                    endpoint,
                    iteration,
                    discovered = discovered.len(),
                    "listing exhausted"
                );
                break;
            }

            if returned == 0 {
                // A page claiming more results while returning none would
                // loop forever on the same offset.
                warn!(endpoint, offset, "empty page with hasMore set — stopping discovery");
                break;
            }

            offset += returned;
        }

        Ok(discovered)
    }

    fn parse_listing(
        &self,
        kind: ListingKind,
        body: &str,
        endpoint: &str,
    ) -> Result<ListingPage, ScraperError> {
        match kind {
            ListingKind::Brands => self.parser.parse_brand_list(body, endpoint),
            ListingKind::Products => self.parser.parse_product_list(body, endpoint),
        }
    }

    /// The cursor's arithmetic wins when present; otherwise the `hasMore`
    /// flag alone decides. The next offset is compared against the total
    /// directly, since a short page leaves the nominal `count` overshooting.
    fn page_has_next(&self, page: &ListingPage, returned: u64) -> bool {
        match &page.cursor {
            Some(cursor) => {
                let next = cursor.advanced_by(returned);
                page.has_more && next.offset < next.total_count
            }
            None => page.has_more,
        }
    }
}

//! Detail-page extraction pipelines.
//!
//! Fetch → parse → normalize → validate → duplicate check → persist, in that
//! order. The duplicate detector is only updated after a successful
//! persistence call, so a failed job retried later is not wrongly skipped.

use tracing::{debug, warn};

use htdb_core::{record_preview, validate_brand, validate_product, NormalizedBrand, NormalizedProduct};

use crate::client;
use crate::engine::{lock, ExtractOutcome, ScraperEngine};
use crate::error::ScraperError;
use crate::normalize::{normalize_brand, normalize_product};

impl ScraperEngine {
    /// Extracts and persists one brand by slug.
    ///
    /// # Errors
    ///
    /// Any pipeline stage failure is returned after being counted and logged
    /// with its stage; callers decide whether to retry.
    pub async fn extract_brand_data(
        &self,
        slug: &str,
    ) -> Result<ExtractOutcome<NormalizedBrand>, ScraperError> {
        match self.extract_brand_inner(slug).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.record_item_failure("brand", slug, &e).await;
                Err(e)
            }
        }
    }

    /// Extracts and persists one product by slug, scoped to its parent
    /// brand.
    ///
    /// # Errors
    ///
    /// Same contract as [`ScraperEngine::extract_brand_data`]; additionally
    /// fails with [`ScraperError::MissingParentBrand`] when the parent brand
    /// cannot be resolved in storage.
    pub async fn extract_product_data(
        &self,
        slug: &str,
        brand_slug: &str,
    ) -> Result<ExtractOutcome<NormalizedProduct>, ScraperError> {
        match self.extract_product_inner(slug, brand_slug).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.record_item_failure("product", slug, &e).await;
                Err(e)
            }
        }
    }

    async fn extract_brand_inner(
        &self,
        slug: &str,
    ) -> Result<ExtractOutcome<NormalizedBrand>, ScraperError> {
        let url = client::brand_detail_url(&self.config.base_url, slug)?;
        let body = self.fetcher.fetch(&url).await?;
        let raw = self.parser.parse_brand_detail(&body, slug)?;
        let record = normalize_brand(raw, &url, &self.config.base_url)?;

        let report = validate_brand(&record);
        if !report.is_valid {
            warn!(
                slug = %record.slug,
                errors = ?report.errors,
                preview = %record_preview(&record),
                "brand failed validation"
            );
            return Err(ScraperError::Validation {
                identifier: record.slug,
                errors: report.errors,
            });
        }

        if lock(&self.detector).has_brand(&record.slug) {
            debug!(slug = %record.slug, "duplicate brand — skipping persist");
            lock(&self.counters).duplicates_skipped += 1;
            return Ok(ExtractOutcome::Duplicate);
        }

        let brand_id = self.store.upsert_brand(&record).await?;
        lock(&self.detector).add_brand(&record.slug);
        lock(&self.counters).brands_processed += 1;
        debug!(slug = %record.slug, brand_id, "brand persisted");
        self.flush_run_counters().await;

        Ok(ExtractOutcome::Persisted(record))
    }

    async fn extract_product_inner(
        &self,
        slug: &str,
        brand_slug: &str,
    ) -> Result<ExtractOutcome<NormalizedProduct>, ScraperError> {
        let url = client::product_detail_url(&self.config.base_url, brand_slug, slug)?;
        let body = self.fetcher.fetch(&url).await?;
        let raw = self.parser.parse_product_detail(&body, slug, brand_slug)?;
        let record = normalize_product(raw, brand_slug, &url, &self.config.base_url)?;

        let report = validate_product(&record);
        if !report.is_valid {
            warn!(
                slug = %record.slug,
                brand = %record.brand_slug,
                errors = ?report.errors,
                preview = %record_preview(&record),
                "product failed validation"
            );
            return Err(ScraperError::Validation {
                identifier: record.slug,
                errors: report.errors,
            });
        }

        if lock(&self.detector).has_product(&record.brand_slug, &record.slug) {
            debug!(
                slug = %record.slug,
                brand = %record.brand_slug,
                "duplicate product — skipping persist"
            );
            lock(&self.counters).duplicates_skipped += 1;
            return Ok(ExtractOutcome::Duplicate);
        }

        let brand_id = self.resolve_brand_id(&record).await?;
        let product_id = self.store.create_product(brand_id, &record).await?;
        lock(&self.detector).add_product(&record.brand_slug, &record.slug);
        lock(&self.counters).products_processed += 1;
        debug!(slug = %record.slug, brand_id, product_id, "product persisted");
        self.flush_run_counters().await;

        Ok(ExtractOutcome::Persisted(record))
    }

    /// Resolves a product's parent brand: exact slug lookup first, then a
    /// name search as fallback for slug drift between listing and storage.
    async fn resolve_brand_id(&self, product: &NormalizedProduct) -> Result<i64, ScraperError> {
        if let Some(brand) = self.store.find_brand_by_slug(&product.brand_slug).await? {
            return Ok(brand.id);
        }

        let name_guess = product.brand_slug.replace('-', " ");
        let candidates = self.store.search_brands_by_name(&name_guess, 1).await?;
        if let Some(brand) = candidates.into_iter().next() {
            warn!(
                brand_slug = %product.brand_slug,
                resolved_slug = %brand.slug,
                "parent brand resolved by name search, not slug"
            );
            return Ok(brand.id);
        }

        Err(ScraperError::MissingParentBrand {
            brand_slug: product.brand_slug.clone(),
            product_slug: product.slug.clone(),
        })
    }

    /// Counts and logs a pipeline failure, and bumps the run's error count
    /// in storage when a run is active. Storage trouble here must not mask
    /// the original error, so it is logged and swallowed.
    pub(crate) async fn record_item_failure(
        &self,
        entity: &'static str,
        identifier: &str,
        error: &ScraperError,
    ) {
        lock(&self.counters).failed += 1;
        tracing::error!(
            entity,
            identifier,
            stage = error.stage(),
            error = %error,
            "extraction failed"
        );

        let run_id = lock(&self.operation).as_ref().map(|op| op.id);
        if let Some(run_id) = run_id {
            if let Err(e) = self.store.increment_error_count(run_id).await {
                warn!(run_id, error = %e, "failed to bump run error count");
            }
        }
    }

    /// Best-effort push of the in-memory counters to the active run row.
    pub(crate) async fn flush_run_counters(&self) {
        let run_id = lock(&self.operation).as_ref().map(|op| op.id);
        let Some(run_id) = run_id else { return };

        let (brands, products) = {
            let counters = lock(&self.counters);
            (counters.brands_processed, counters.products_processed)
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let (brands, products) = (brands as i32, products as i32);
        if let Err(e) = self.store.update_run_counters(run_id, brands, products).await {
            warn!(run_id, error = %e, "failed to update run counters");
        }
    }
}

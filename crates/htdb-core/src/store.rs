//! Storage port consumed by the scraping engine.
//!
//! The engine never talks to a database directly; it persists through this
//! trait so the Postgres implementation (htdb-db) and in-memory test doubles
//! are interchangeable. Metadata/counter updates are invoked best-effort by
//! the engine: implementations should return errors normally and leave the
//! log-and-continue policy to the caller.

use async_trait::async_trait;
use thiserror::Error;

use crate::records::{NormalizedBrand, NormalizedProduct};
use crate::runs::{OperationMetadata, RunType};

/// Minimal reference to a stored brand, used to resolve the parent of a
/// product before insert.
#[derive(Debug, Clone)]
pub struct BrandRef {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence operations the scraping engine depends on.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Upserts a brand keyed by its natural identity (slug); returns the
    /// storage id of the resulting row.
    async fn upsert_brand(&self, brand: &NormalizedBrand) -> Result<i64, StoreError>;

    /// Inserts (or updates) a product scoped to an already-stored brand.
    async fn create_product(
        &self,
        brand_id: i64,
        product: &NormalizedProduct,
    ) -> Result<i64, StoreError>;

    /// Looks up a stored brand by slug.
    async fn find_brand_by_slug(&self, slug: &str) -> Result<Option<BrandRef>, StoreError>;

    /// Case-insensitive name search, bounded by `limit`. Used as a fallback
    /// when a product's parent brand cannot be resolved by slug.
    async fn search_brands_by_name(
        &self,
        name: &str,
        limit: i64,
    ) -> Result<Vec<BrandRef>, StoreError>;

    /// Creates run metadata in `in_progress` status and returns it.
    async fn create_run(&self, run_type: RunType) -> Result<OperationMetadata, StoreError>;

    /// Overwrites the processed counters for a run.
    async fn update_run_counters(
        &self,
        run_id: i64,
        brands_processed: i32,
        products_processed: i32,
    ) -> Result<(), StoreError>;

    /// Bumps the run's error counter by one.
    async fn increment_error_count(&self, run_id: i64) -> Result<(), StoreError>;

    /// Terminal transition to `completed`.
    async fn complete_run(&self, run_id: i64) -> Result<(), StoreError>;

    /// Terminal transition to `failed` with a reason.
    async fn fail_run(&self, run_id: i64, reason: &str) -> Result<(), StoreError>;
}

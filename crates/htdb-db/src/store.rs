//! Postgres-backed implementation of the engine's storage port.
//!
//! Thin adapter over the query modules: maps [`DbError`] into the
//! backend-agnostic [`StoreError`] and row types into the core types the
//! engine works with.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use htdb_core::{
    BrandRef, CatalogStore, NormalizedBrand, NormalizedProduct, OperationMetadata, RunStatus,
    RunType, StoreError,
};

use crate::runs::ScrapeRunRow;
use crate::{brands, products, runs, DbError};

#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_err(err: DbError) -> StoreError {
    match err {
        DbError::NotFound => StoreError::NotFound,
        other => StoreError::Backend(other.to_string()),
    }
}

fn run_metadata(row: ScrapeRunRow) -> OperationMetadata {
    let run_type = RunType::parse(&row.run_type).unwrap_or_else(|| {
        warn!(run_id = row.id, run_type = %row.run_type, "unknown run_type in scrape_runs row");
        RunType::FullRefresh
    });
    let status = RunStatus::parse(&row.status).unwrap_or_else(|| {
        warn!(run_id = row.id, status = %row.status, "unknown status in scrape_runs row");
        RunStatus::InProgress
    });
    OperationMetadata {
        id: row.id,
        public_id: row.public_id,
        run_type,
        status,
        started_at: row.started_at,
        completed_at: row.completed_at,
        brands_processed: row.brands_processed,
        products_processed: row.products_processed,
        error_count: row.error_count,
        error_message: row.error_message,
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn upsert_brand(&self, brand: &NormalizedBrand) -> Result<i64, StoreError> {
        let row = brands::upsert_brand(&self.pool, brand)
            .await
            .map_err(map_err)?;
        Ok(row.id)
    }

    async fn create_product(
        &self,
        brand_id: i64,
        product: &NormalizedProduct,
    ) -> Result<i64, StoreError> {
        let row = products::upsert_product(&self.pool, brand_id, product)
            .await
            .map_err(map_err)?;
        Ok(row.id)
    }

    async fn find_brand_by_slug(&self, slug: &str) -> Result<Option<BrandRef>, StoreError> {
        let row = brands::get_brand_by_slug(&self.pool, slug)
            .await
            .map_err(map_err)?;
        Ok(row.map(|b| BrandRef {
            id: b.id,
            slug: b.slug,
            name: b.name,
        }))
    }

    async fn search_brands_by_name(
        &self,
        name: &str,
        limit: i64,
    ) -> Result<Vec<BrandRef>, StoreError> {
        let rows = brands::search_brands_by_name(&self.pool, name, limit)
            .await
            .map_err(map_err)?;
        Ok(rows
            .into_iter()
            .map(|b| BrandRef {
                id: b.id,
                slug: b.slug,
                name: b.name,
            })
            .collect())
    }

    async fn create_run(&self, run_type: RunType) -> Result<OperationMetadata, StoreError> {
        let row = runs::create_scrape_run(&self.pool, run_type.as_str())
            .await
            .map_err(map_err)?;
        Ok(run_metadata(row))
    }

    async fn update_run_counters(
        &self,
        run_id: i64,
        brands_processed: i32,
        products_processed: i32,
    ) -> Result<(), StoreError> {
        runs::update_run_counters(&self.pool, run_id, brands_processed, products_processed)
            .await
            .map_err(map_err)
    }

    async fn increment_error_count(&self, run_id: i64) -> Result<(), StoreError> {
        runs::increment_run_error_count(&self.pool, run_id)
            .await
            .map_err(map_err)
    }

    async fn complete_run(&self, run_id: i64) -> Result<(), StoreError> {
        runs::complete_scrape_run(&self.pool, run_id)
            .await
            .map_err(map_err)
    }

    async fn fail_run(&self, run_id: i64, reason: &str) -> Result<(), StoreError> {
        runs::fail_scrape_run(&self.pool, run_id, reason)
            .await
            .map_err(map_err)
    }
}

//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use htdb_core::NormalizedProduct;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub public_id: Uuid,
    pub brand_id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts a product or, on `(brand_id, slug)` conflict, refreshes the
/// existing row with the newly scraped values. Returns the full resulting
/// row either way.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails (including a missing
/// `brand_id` foreign key).
pub async fn upsert_product(
    pool: &PgPool,
    brand_id: i64,
    product: &NormalizedProduct,
) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products (brand_id, name, slug, description, image_url, source_url, scraped_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (brand_id, slug) DO UPDATE SET \
             name        = EXCLUDED.name, \
             description = COALESCE(EXCLUDED.description, products.description), \
             image_url   = COALESCE(EXCLUDED.image_url, products.image_url), \
             source_url  = EXCLUDED.source_url, \
             scraped_at  = EXCLUDED.scraped_at, \
             updated_at  = NOW() \
         RETURNING id, public_id, brand_id, name, slug, description, image_url, source_url, \
                   scraped_at, created_at, updated_at",
    )
    .bind(brand_id)
    .bind(&product.name)
    .bind(&product.slug)
    .bind(product.description.as_deref())
    .bind(product.image_url.as_deref())
    .bind(&product.source_url)
    .bind(product.scraped_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns a single product by brand id and slug, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_slug(
    pool: &PgPool,
    brand_id: i64,
    slug: &str,
) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, public_id, brand_id, name, slug, description, image_url, source_url, \
                scraped_at, created_at, updated_at \
         FROM products \
         WHERE brand_id = $1 AND slug = $2",
    )
    .bind(brand_id)
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all products for a brand, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products_for_brand(
    pool: &PgPool,
    brand_id: i64,
) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, public_id, brand_id, name, slug, description, image_url, source_url, \
                scraped_at, created_at, updated_at \
         FROM products \
         WHERE brand_id = $1 \
         ORDER BY name",
    )
    .bind(brand_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

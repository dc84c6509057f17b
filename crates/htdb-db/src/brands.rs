//! Database operations for the `brands` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use htdb_core::NormalizedBrand;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `brands` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: i64,
    pub public_id: Uuid,
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

/// Inserts a brand or, on slug conflict, refreshes the existing row with the
/// newly scraped values. A scraped `NULL` description or image never clobbers
/// a previously stored value. Returns the full resulting row either way.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_brand(pool: &PgPool, brand: &NormalizedBrand) -> Result<BrandRow, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(
        "INSERT INTO brands (name, slug, description, image_url, source_url, scraped_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (slug) DO UPDATE SET \
             name        = EXCLUDED.name, \
             description = COALESCE(EXCLUDED.description, brands.description), \
             image_url   = COALESCE(EXCLUDED.image_url, brands.image_url), \
             source_url  = EXCLUDED.source_url, \
             scraped_at  = EXCLUDED.scraped_at, \
             updated_at  = NOW() \
         RETURNING id, public_id, name, slug, description, image_url, source_url, \
                   scraped_at, created_at, updated_at",
    )
    .bind(&brand.name)
    .bind(&brand.slug)
    .bind(brand.description.as_deref())
    .bind(brand.image_url.as_deref())
    .bind(&brand.source_url)
    .bind(brand.scraped_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns a single brand by slug, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_brand_by_slug(pool: &PgPool, slug: &str) -> Result<Option<BrandRow>, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(
        "SELECT id, public_id, name, slug, description, image_url, source_url, \
                scraped_at, created_at, updated_at \
         FROM brands \
         WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Case-insensitive substring search on brand name, bounded by `limit`,
/// ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn search_brands_by_name(
    pool: &PgPool,
    name: &str,
    limit: i64,
) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(
        "SELECT id, public_id, name, slug, description, image_url, source_url, \
                scraped_at, created_at, updated_at \
         FROM brands \
         WHERE name ILIKE '%' || $1 || '%' \
         ORDER BY name \
         LIMIT $2",
    )
    .bind(name)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns all brands, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands(pool: &PgPool) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(
        "SELECT id, public_id, name, slug, description, image_url, source_url, \
                scraped_at, created_at, updated_at \
         FROM brands \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

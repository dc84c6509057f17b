use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tobacco brand scraped from the review site, normalized for storage and
/// comparison across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedBrand {
    /// URL-safe identifier derived from the canonical detail URL's final path
    /// segment, e.g. `"al-fakher"`. Falls back to a slugified name when the
    /// URL carries no usable segment.
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Canonical detail-page URL with tracking parameters stripped.
    pub source_url: String,
    /// When this record was scraped, not when the site last updated it.
    pub scraped_at: DateTime<Utc>,
}

/// A single tobacco product (flavor/blend) under a [`NormalizedBrand`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedProduct {
    /// URL-safe identifier, unique within the owning brand only. The same
    /// product slug (e.g. `"mint"`) may exist under many brands.
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub source_url: String,
    /// Slug of the owning brand; products are always scoped to a brand.
    pub brand_slug: String,
    pub scraped_at: DateTime<Utc>,
}

impl NormalizedBrand {
    /// Returns `true` if the record carries a non-empty description.
    #[must_use]
    pub fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.is_empty())
    }
}

impl NormalizedProduct {
    /// Composite identity of this product: `(brand_slug, slug)`.
    #[must_use]
    pub fn identity(&self) -> (&str, &str) {
        (&self.brand_slug, &self.slug)
    }
}

//! Normalization from raw site records to the canonical catalog shapes.
//!
//! Slug and URL handling is delegated to [`htdb_core::slug`]; this module
//! focuses on whitespace cleanup and field derivation. Normalization never
//! talks to the network: the detail URL the record was fetched from is
//! passed in as the fallback source URL.

use chrono::Utc;

use htdb_core::{canonicalize_url, slug_from_url, slugify, NormalizedBrand, NormalizedProduct};

use crate::error::ScraperError;
use crate::types::{RawBrand, RawProduct};

/// Normalizes a raw brand detail record.
///
/// The slug comes from the canonical source URL's final path segment,
/// falling back to a slugified name when the URL yields nothing usable.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] when no slug can be derived at all
/// (empty name and unusable URL).
pub fn normalize_brand(
    raw: RawBrand,
    detail_url: &str,
    base_url: &str,
) -> Result<NormalizedBrand, ScraperError> {
    let name = collapse_whitespace(&raw.name);
    let source_url = canonical_source_url(raw.url.as_deref(), detail_url, base_url);
    let slug = derive_slug(&source_url, &name).ok_or_else(|| ScraperError::Parse {
        identifier: detail_url.to_owned(),
        reason: "cannot derive a slug from URL or name".to_owned(),
    })?;

    Ok(NormalizedBrand {
        slug,
        name,
        description: clean_optional(raw.description),
        image_url: raw
            .image
            .as_deref()
            .and_then(|u| canonicalize_url(u, base_url)),
        source_url,
        scraped_at: Utc::now(),
    })
}

/// Normalizes a raw product detail record, scoped to its owning brand.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] when no slug can be derived.
pub fn normalize_product(
    raw: RawProduct,
    brand_slug: &str,
    detail_url: &str,
    base_url: &str,
) -> Result<NormalizedProduct, ScraperError> {
    let name = collapse_whitespace(&raw.name);
    let source_url = canonical_source_url(raw.url.as_deref(), detail_url, base_url);
    let slug = derive_slug(&source_url, &name).ok_or_else(|| ScraperError::Parse {
        identifier: detail_url.to_owned(),
        reason: "cannot derive a slug from URL or name".to_owned(),
    })?;

    Ok(NormalizedProduct {
        slug,
        name,
        description: clean_optional(raw.description),
        image_url: raw
            .image
            .as_deref()
            .and_then(|u| canonicalize_url(u, base_url)),
        source_url,
        brand_slug: brand_slug.to_owned(),
        scraped_at: Utc::now(),
    })
}

fn canonical_source_url(raw_url: Option<&str>, detail_url: &str, base_url: &str) -> String {
    raw_url
        .and_then(|u| canonicalize_url(u, base_url))
        .or_else(|| canonicalize_url(detail_url, base_url))
        .unwrap_or_else(|| detail_url.to_owned())
}

fn derive_slug(source_url: &str, name: &str) -> Option<String> {
    if let Some(slug) = slug_from_url(source_url) {
        return Some(slug);
    }
    let fallback = slugify(name);
    if fallback.is_empty() {
        None
    } else {
        Some(fallback)
    }
}

/// Trims and collapses runs of internal whitespace into single spaces.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;

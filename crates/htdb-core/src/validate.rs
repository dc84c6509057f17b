//! Field-level validation for normalized records.
//!
//! Validation failures are recoverable per-item skips, not errors: callers
//! log the error list together with a truncated JSON preview of the
//! offending record and move on to the next item.

use serde::Serialize;
use url::Url;

use crate::records::{NormalizedBrand, NormalizedProduct};

pub const MAX_NAME_LEN: usize = 500;
pub const MAX_SLUG_LEN: usize = 500;
pub const MAX_DESCRIPTION_LEN: usize = 10_000;
pub const MAX_URL_LEN: usize = 2_000;

/// Maximum length of the JSON preview embedded in validation-failure logs.
pub const MAX_PREVIEW_LEN: usize = 500;

/// Outcome of validating a single record.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates a [`NormalizedBrand`]: required fields present, lengths bounded,
/// URLs well-formed.
#[must_use]
pub fn validate_brand(brand: &NormalizedBrand) -> ValidationReport {
    let mut errors = Vec::new();
    check_identifier("slug", &brand.slug, &mut errors);
    check_name(&brand.name, &mut errors);
    check_description(brand.description.as_deref(), &mut errors);
    check_url("source_url", &brand.source_url, &mut errors);
    if let Some(image_url) = brand.image_url.as_deref() {
        check_url("image_url", image_url, &mut errors);
    }
    ValidationReport::from_errors(errors)
}

/// Validates a [`NormalizedProduct`]; in addition to the brand checks, the
/// owning `brand_slug` must be present.
#[must_use]
pub fn validate_product(product: &NormalizedProduct) -> ValidationReport {
    let mut errors = Vec::new();
    check_identifier("slug", &product.slug, &mut errors);
    check_identifier("brand_slug", &product.brand_slug, &mut errors);
    check_name(&product.name, &mut errors);
    check_description(product.description.as_deref(), &mut errors);
    check_url("source_url", &product.source_url, &mut errors);
    if let Some(image_url) = product.image_url.as_deref() {
        check_url("image_url", image_url, &mut errors);
    }
    ValidationReport::from_errors(errors)
}

/// Serializes `record` to JSON and truncates to [`MAX_PREVIEW_LEN`]
/// characters for inclusion in log lines. Falls back to a placeholder when
/// serialization fails so logging never becomes a failure path.
pub fn record_preview<T: Serialize>(record: &T) -> String {
    let json = serde_json::to_string(record)
        .unwrap_or_else(|_| "<record preview unavailable>".to_string());
    if json.chars().count() <= MAX_PREVIEW_LEN {
        json
    } else {
        let truncated: String = json.chars().take(MAX_PREVIEW_LEN).collect();
        format!("{truncated}…")
    }
}

// Bounds are in characters, not bytes; multi-byte names must not trip them.
fn check_identifier(field: &str, value: &str, errors: &mut Vec<String>) {
    if value.is_empty() {
        errors.push(format!("{field} is required"));
    } else if value.chars().count() > MAX_SLUG_LEN {
        errors.push(format!("{field} exceeds {MAX_SLUG_LEN} characters"));
    }
}

fn check_name(name: &str, errors: &mut Vec<String>) {
    if name.trim().is_empty() {
        errors.push("name is required".to_string());
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.push(format!("name exceeds {MAX_NAME_LEN} characters"));
    }
}

fn check_description(description: Option<&str>, errors: &mut Vec<String>) {
    if let Some(d) = description {
        if d.chars().count() > MAX_DESCRIPTION_LEN {
            errors.push(format!("description exceeds {MAX_DESCRIPTION_LEN} characters"));
        }
    }
}

fn check_url(field: &str, value: &str, errors: &mut Vec<String>) {
    if value.is_empty() {
        errors.push(format!("{field} is required"));
        return;
    }
    if value.chars().count() > MAX_URL_LEN {
        errors.push(format!("{field} exceeds {MAX_URL_LEN} characters"));
    }
    if Url::parse(value).is_err() {
        errors.push(format!("{field} is not a valid URL"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn valid_brand() -> NormalizedBrand {
        NormalizedBrand {
            slug: "al-fakher".to_string(),
            name: "Al Fakher".to_string(),
            description: Some("Classic Emirati brand.".to_string()),
            image_url: None,
            source_url: "https://htreviews.example/brands/al-fakher".to_string(),
            scraped_at: Utc::now(),
        }
    }

    fn valid_product() -> NormalizedProduct {
        NormalizedProduct {
            slug: "mint".to_string(),
            name: "Mint".to_string(),
            description: None,
            image_url: None,
            source_url: "https://htreviews.example/brands/al-fakher/products/mint".to_string(),
            brand_slug: "al-fakher".to_string(),
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn valid_brand_passes() {
        let report = validate_brand(&valid_brand());
        assert!(report.is_valid, "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn missing_name_fails() {
        let mut brand = valid_brand();
        brand.name = "   ".to_string();
        let report = validate_brand(&brand);
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("name is required")));
    }

    #[test]
    fn overlong_name_fails() {
        let mut brand = valid_brand();
        brand.name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(!validate_brand(&brand).is_valid);
    }

    #[test]
    fn multibyte_name_within_char_bound_passes() {
        let mut brand = valid_brand();
        // 400 characters but well over 500 bytes.
        brand.name = "ü".repeat(400);
        let report = validate_brand(&brand);
        assert!(report.is_valid, "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn multibyte_name_over_char_bound_fails() {
        let mut brand = valid_brand();
        brand.name = "ü".repeat(MAX_NAME_LEN + 1);
        assert!(!validate_brand(&brand).is_valid);
    }

    #[test]
    fn overlong_description_fails() {
        let mut brand = valid_brand();
        brand.description = Some("x".repeat(MAX_DESCRIPTION_LEN + 1));
        assert!(!validate_brand(&brand).is_valid);
    }

    #[test]
    fn malformed_source_url_fails() {
        let mut brand = valid_brand();
        brand.source_url = "not a url".to_string();
        let report = validate_brand(&brand);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("source_url is not a valid URL")));
    }

    #[test]
    fn overlong_url_fails() {
        let mut brand = valid_brand();
        brand.source_url = format!("https://htreviews.example/{}", "a".repeat(MAX_URL_LEN));
        assert!(!validate_brand(&brand).is_valid);
    }

    #[test]
    fn absent_image_url_is_fine_but_malformed_is_not() {
        let mut product = valid_product();
        assert!(validate_product(&product).is_valid);
        product.image_url = Some("://bad".to_string());
        assert!(!validate_product(&product).is_valid);
    }

    #[test]
    fn product_requires_brand_slug() {
        let mut product = valid_product();
        product.brand_slug = String::new();
        let report = validate_product(&product);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("brand_slug is required")));
    }

    #[test]
    fn record_preview_truncates_long_records() {
        let mut brand = valid_brand();
        brand.description = Some("d".repeat(5_000));
        let preview = record_preview(&brand);
        assert!(preview.chars().count() <= MAX_PREVIEW_LEN + 1);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn record_preview_keeps_short_records_intact() {
        let product = valid_product();
        let preview = record_preview(&product);
        assert!(preview.contains("\"slug\":\"mint\""));
        assert!(!preview.ends_with('…'));
    }
}

//! Cross-run duplicate detection for brand and product identifiers.
//!
//! The same canonical entity shows up with different casing between listing
//! and detail pages, and every scheduled re-crawl sees the whole catalog
//! again, so membership checks must be idempotent and O(1) at the scale of
//! thousands of products. Keys are normalized with `trim` + lowercase before
//! lookup. Products are double-keyed by `(brand, product)` so identical
//! product slugs under different brands never collide.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct DuplicateDetector {
    brands: HashSet<String>,
    products: HashMap<String, HashSet<String>>,
    total_count: usize,
}

impl DuplicateDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a brand slug. Returns `true` if the slug was already present
    /// (a duplicate — no mutation); `false` on first sight, in which case it
    /// is inserted and the total count bumps.
    pub fn add_brand(&mut self, slug: &str) -> bool {
        let key = normalize_key(slug);
        if self.brands.contains(&key) {
            return true;
        }
        self.brands.insert(key);
        self.total_count += 1;
        false
    }

    /// Records a product slug under a brand. Same contract as
    /// [`Self::add_brand`].
    pub fn add_product(&mut self, brand_slug: &str, product_slug: &str) -> bool {
        let brand_key = normalize_key(brand_slug);
        let product_key = normalize_key(product_slug);
        let entry = self.products.entry(brand_key).or_default();
        if entry.contains(&product_key) {
            return true;
        }
        entry.insert(product_key);
        self.total_count += 1;
        false
    }

    #[must_use]
    pub fn has_brand(&self, slug: &str) -> bool {
        self.brands.contains(&normalize_key(slug))
    }

    #[must_use]
    pub fn has_product(&self, brand_slug: &str, product_slug: &str) -> bool {
        self.products
            .get(&normalize_key(brand_slug))
            .is_some_and(|set| set.contains(&normalize_key(product_slug)))
    }

    #[must_use]
    pub fn brand_count(&self) -> usize {
        self.brands.len()
    }

    /// Total distinct products across all brands.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.values().map(HashSet::len).sum()
    }

    /// Distinct products recorded for one brand.
    #[must_use]
    pub fn product_count_for(&self, brand_slug: &str) -> usize {
        self.products
            .get(&normalize_key(brand_slug))
            .map_or(0, HashSet::len)
    }

    /// All first-seen inserts since construction or the last [`Self::clear`].
    /// Invariant: `total_count == brand_count() + product_count()`.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Normalized brand slugs seen so far, unordered.
    #[must_use]
    pub fn brands(&self) -> Vec<String> {
        self.brands.iter().cloned().collect()
    }

    /// Normalized `(brand, product)` pairs seen so far, unordered.
    #[must_use]
    pub fn products(&self) -> Vec<(String, String)> {
        self.products
            .iter()
            .flat_map(|(brand, set)| set.iter().map(move |p| (brand.clone(), p.clone())))
            .collect()
    }

    /// Forgets everything; every previously-seen key becomes first-seen again.
    pub fn clear(&mut self) {
        self.brands.clear();
        self.products.clear();
        self.total_count = 0;
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_brand_first_seen_then_duplicate() {
        let mut detector = DuplicateDetector::new();
        assert!(!detector.add_brand("al-fakher"));
        assert!(detector.add_brand("al-fakher"));
        assert_eq!(detector.brand_count(), 1);
    }

    #[test]
    fn add_brand_is_case_and_whitespace_insensitive() {
        let mut detector = DuplicateDetector::new();
        assert!(!detector.add_brand("al-fakher"));
        assert!(detector.add_brand("Al-Fakher"));
        assert!(detector.add_brand("  AL-FAKHER  "));
        assert_eq!(detector.brand_count(), 1);
        assert_eq!(detector.total_count(), 1);
    }

    #[test]
    fn has_brand_matches_any_casing() {
        let mut detector = DuplicateDetector::new();
        detector.add_brand("Tangiers");
        assert!(detector.has_brand("tangiers"));
        assert!(detector.has_brand("TANGIERS "));
        assert!(!detector.has_brand("sarma"));
    }

    #[test]
    fn same_product_slug_under_different_brands_does_not_collide() {
        let mut detector = DuplicateDetector::new();
        assert!(!detector.add_product("al-fakher", "mint"));
        assert!(!detector.add_product("tangiers", "mint"));
        assert_eq!(detector.product_count_for("al-fakher"), 1);
        assert_eq!(detector.product_count_for("tangiers"), 1);
        assert_eq!(detector.product_count(), 2);
    }

    #[test]
    fn duplicate_product_within_brand_is_detected() {
        let mut detector = DuplicateDetector::new();
        assert!(!detector.add_product("al-fakher", "Two Apples"));
        assert!(detector.add_product("al-fakher", "two apples"));
        assert_eq!(detector.product_count_for("al-fakher"), 1);
    }

    #[test]
    fn total_count_invariant_holds_over_mixed_adds() {
        let mut detector = DuplicateDetector::new();
        detector.add_brand("al-fakher");
        detector.add_brand("tangiers");
        detector.add_brand("al-fakher"); // duplicate, no increment
        detector.add_product("al-fakher", "mint");
        detector.add_product("al-fakher", "mint"); // duplicate
        detector.add_product("tangiers", "cane-mint");
        assert_eq!(
            detector.total_count(),
            detector.brand_count() + detector.product_count()
        );
        assert_eq!(detector.total_count(), 4);
    }

    #[test]
    fn clear_resets_counts_and_membership() {
        let mut detector = DuplicateDetector::new();
        detector.add_brand("al-fakher");
        detector.add_product("al-fakher", "mint");
        detector.clear();
        assert_eq!(detector.total_count(), 0);
        assert_eq!(detector.brand_count(), 0);
        assert_eq!(detector.product_count(), 0);
        // Previously-seen keys are first-seen again.
        assert!(!detector.add_brand("al-fakher"));
        assert!(!detector.add_product("al-fakher", "mint"));
    }

    #[test]
    fn total_count_invariant_holds_after_clear() {
        let mut detector = DuplicateDetector::new();
        detector.add_brand("a");
        detector.add_product("a", "x");
        detector.clear();
        detector.add_product("b", "y");
        assert_eq!(
            detector.total_count(),
            detector.brand_count() + detector.product_count()
        );
    }

    #[test]
    fn listings_expose_normalized_keys() {
        let mut detector = DuplicateDetector::new();
        detector.add_brand("Al-Fakher");
        detector.add_product("Al-Fakher", "Mint");
        assert_eq!(detector.brands(), vec!["al-fakher".to_string()]);
        assert_eq!(
            detector.products(),
            vec![("al-fakher".to_string(), "mint".to_string())]
        );
    }

    #[test]
    fn product_count_for_unknown_brand_is_zero() {
        let detector = DuplicateDetector::new();
        assert_eq!(detector.product_count_for("nakhla"), 0);
    }
}

use super::*;

#[test]
fn listing_url_appends_offset_and_count() {
    let url = listing_url("https://htreviews.example", "/api/brands", 0, 25).unwrap();
    assert_eq!(url, "https://htreviews.example/api/brands?offset=0&count=25");
}

#[test]
fn listing_url_strips_trailing_slash() {
    let url = listing_url("https://htreviews.example/", "/api/brands", 50, 25).unwrap();
    assert_eq!(
        url,
        "https://htreviews.example/api/brands?offset=50&count=25"
    );
}

#[test]
fn listing_url_rejects_invalid_base() {
    let result = listing_url("not-a-url", "/api/brands", 0, 25);
    assert!(
        matches!(result, Err(ScraperError::InvalidBaseUrl { .. })),
        "expected InvalidBaseUrl, got: {result:?}"
    );
}

#[test]
fn brand_detail_url_embeds_slug() {
    let url = brand_detail_url("https://htreviews.example", "al-fakher").unwrap();
    assert_eq!(url, "https://htreviews.example/api/brands/al-fakher");
}

#[test]
fn product_detail_url_is_brand_scoped() {
    let url = product_detail_url("https://htreviews.example", "al-fakher", "mint").unwrap();
    assert_eq!(
        url,
        "https://htreviews.example/api/brands/al-fakher/products/mint"
    );
}

#[test]
fn products_endpoint_embeds_brand() {
    assert_eq!(products_endpoint("tangiers"), "/api/brands/tangiers/products");
}

#[test]
fn extract_domain_strips_scheme_and_path() {
    assert_eq!(
        extract_domain("https://htreviews.example/api/brands?offset=0"),
        "htreviews.example"
    );
}

#[test]
fn extract_domain_fallback_on_unparseable() {
    assert_eq!(extract_domain("not a url"), "not a url");
}

//! Slug derivation and URL canonicalization.
//!
//! The review site is inconsistent about identifier casing between listing
//! and detail pages, and detail links occasionally arrive relative or padded
//! with tracking parameters. Everything that becomes a record key funnels
//! through these helpers first.

use url::Url;

/// Query parameters stripped during canonicalization. Matching is by exact
/// name except `utm_`, which matches as a prefix.
const TRACKING_PARAMS: &[&str] = &["ref", "fbclid", "gclid"];

/// Generates a URL-safe slug from a display name: lowercase, keeps only
/// `[a-z0-9-]`, spaces become hyphens, runs of hyphens collapse.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else if c.is_whitespace() {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Derives a slug from the final path segment of a detail URL.
///
/// Returns `None` when the URL does not parse or the path has no non-empty
/// final segment (e.g. `https://example.com/`).
#[must_use]
pub fn slug_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()?;
    let slug = slugify(segment);
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// Canonicalizes a scraped URL: resolves relative references against `base`,
/// strips known tracking query parameters and any fragment.
///
/// Returns `None` when neither `raw` nor `base` + `raw` yields a valid URL.
#[must_use]
pub fn canonicalize_url(raw: &str, base: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut url = match Url::parse(raw) {
        Ok(u) => u,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(base).ok()?.join(raw).ok()?,
        Err(_) => return None,
    };

    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &kept {
            serializer.append_pair(k, v);
        }
        url.set_query(Some(&serializer.finish()));
    }

    Some(url.to_string())
}

fn is_tracking_param(name: &str) -> bool {
    name.starts_with("utm_") || TRACKING_PARAMS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Al Fakher"), "al-fakher");
    }

    #[test]
    fn slugify_strips_punctuation() {
        assert_eq!(slugify("Trifecta: Dark Blend!"), "trifecta-dark-blend");
    }

    #[test]
    fn slugify_collapses_hyphen_runs() {
        assert_eq!(slugify("Two --  Apples"), "two-apples");
    }

    #[test]
    fn slugify_empty_input_gives_empty_slug() {
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slug_from_url_takes_final_segment() {
        assert_eq!(
            slug_from_url("https://htreviews.example/brands/Al-Fakher").as_deref(),
            Some("al-fakher")
        );
    }

    #[test]
    fn slug_from_url_ignores_trailing_slash() {
        assert_eq!(
            slug_from_url("https://htreviews.example/brands/tangiers/").as_deref(),
            Some("tangiers")
        );
    }

    #[test]
    fn slug_from_url_none_for_bare_origin() {
        assert!(slug_from_url("https://htreviews.example/").is_none());
    }

    #[test]
    fn slug_from_url_none_for_invalid_url() {
        assert!(slug_from_url("not a url").is_none());
    }

    #[test]
    fn canonicalize_resolves_relative_against_base() {
        assert_eq!(
            canonicalize_url("/brands/al-fakher", "https://htreviews.example").as_deref(),
            Some("https://htreviews.example/brands/al-fakher")
        );
    }

    #[test]
    fn canonicalize_strips_utm_and_ref_params() {
        assert_eq!(
            canonicalize_url(
                "https://htreviews.example/brands/sarma?utm_source=feed&ref=home&page=2",
                "https://htreviews.example",
            )
            .as_deref(),
            Some("https://htreviews.example/brands/sarma?page=2")
        );
    }

    #[test]
    fn canonicalize_drops_query_when_only_tracking_params() {
        assert_eq!(
            canonicalize_url(
                "https://htreviews.example/brands/sarma?utm_source=feed&fbclid=abc",
                "https://htreviews.example",
            )
            .as_deref(),
            Some("https://htreviews.example/brands/sarma")
        );
    }

    #[test]
    fn canonicalize_drops_fragment() {
        assert_eq!(
            canonicalize_url(
                "https://htreviews.example/brands/sarma#reviews",
                "https://htreviews.example",
            )
            .as_deref(),
            Some("https://htreviews.example/brands/sarma")
        );
    }

    #[test]
    fn canonicalize_none_for_empty_input() {
        assert!(canonicalize_url("   ", "https://htreviews.example").is_none());
    }
}

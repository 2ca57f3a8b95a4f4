//! URL handling for qna-harvest
//!
//! Normalizes the configured listing URL and resolves the links captured from
//! listing pages into absolute detail-page URLs.

use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and normalizes the canonical listing URL
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject schemes other than http and https
/// 3. Reject URLs without a host
/// 4. Remove the fragment
/// 5. Ensure the path ends with `/` so page paths join beneath it
///
/// # Examples
///
/// ```
/// use qna_harvest::url::normalize_listing_url;
///
/// let url = normalize_listing_url("https://example.com/category/maliki").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/category/maliki/");
/// ```
pub fn normalize_listing_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    check_scheme(&url)?;

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(url_str.to_string()));
    }

    url.set_fragment(None);

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Resolves a captured link against the page it was found on
///
/// Absolute links are returned as-is; relative ones are joined onto `base`.
/// Only http and https results are accepted.
pub fn resolve_link(href: &str, base: &Url) -> UrlResult<Url> {
    let href = href.trim();

    if href.is_empty() {
        return Err(UrlError::Parse("empty link".to_string()));
    }

    let resolved = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    check_scheme(&resolved)?;
    Ok(resolved)
}

/// Placeholder replaced by the page number in a page path
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Builds the URL of listing page `index` by joining `page_path` onto the
/// listing URL, with `{page}` replaced by the index
///
/// # Examples
///
/// ```
/// use qna_harvest::url::{join_page_path, normalize_listing_url};
///
/// let listing = normalize_listing_url("https://example.com/category/maliki/").unwrap();
/// let url = join_page_path(&listing, "page/{page}/", 2).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/category/maliki/page/2/");
/// ```
pub fn join_page_path(listing_url: &Url, page_path: &str, index: u32) -> UrlResult<Url> {
    let relative = page_path.replace(PAGE_PLACEHOLDER, &index.to_string());

    let url = listing_url
        .join(&relative)
        .map_err(|e| UrlError::Parse(format!("page path '{}': {}", relative, e)))?;

    check_scheme(&url)?;
    Ok(url)
}

fn check_scheme(url: &Url) -> UrlResult<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            other
        ))),
    }
}

use crate::UrlError;
use std::fmt;
use url::Url;

/// Reference prefixes that never point at a crawlable document
const NON_DOCUMENT_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// An absolute http(s) URL in canonical form
///
/// Canonical form means: fragment removed, `/index.html` collapsed to `/`,
/// and (when the crawl strips queries) no query string. Instances are only
/// produced by [`canonicalize`], so two equal `CanonicalUrl`s always name the
/// same crawl target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    /// Returns the URL as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the underlying parsed URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the URL path
    pub fn path(&self) -> &str {
        self.0.path()
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Canonicalizes a (possibly relative) URL reference
///
/// # Canonicalization Steps
///
/// 1. Reject `javascript:`, `mailto:`, `tel:` and `data:` references
/// 2. Resolve the reference against `base` (or parse it as absolute)
/// 3. Reject anything that is not http or https, or has no host
/// 4. Remove the fragment
/// 5. Remove the query string when `strip_query` is set
/// 6. Collapse a trailing `/index.html` segment to `/`
///
/// Host lower-casing and dot-segment removal are done by the URL parser.
/// Applying this function to its own output returns the same URL.
///
/// # Arguments
///
/// * `reference` - The href or URL string to canonicalize
/// * `base` - The URL to resolve relative references against
/// * `strip_query` - Whether query strings are dropped
///
/// # Returns
///
/// * `Ok(CanonicalUrl)` - The canonical URL
/// * `Err(UrlError)` - The reference cannot name a crawlable page
///
/// # Examples
///
/// ```
/// use doccrawl::url::canonicalize;
/// use url::Url;
///
/// let base = Url::parse("https://docs.example.com/guide/intro").unwrap();
/// let url = canonicalize("setup/index.html?x=1#top", Some(&base), true).unwrap();
/// assert_eq!(url.as_str(), "https://docs.example.com/guide/setup/");
/// ```
pub fn canonicalize(
    reference: &str,
    base: Option<&Url>,
    strip_query: bool,
) -> Result<CanonicalUrl, UrlError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(UrlError::Parse("empty reference".to_string()));
    }

    let lowered = reference.to_ascii_lowercase();
    if let Some(scheme) = NON_DOCUMENT_SCHEMES
        .iter()
        .find(|prefix| lowered.starts_with(*prefix))
    {
        return Err(UrlError::InvalidScheme(scheme.trim_end_matches(':').to_string()));
    }

    let mut url = match base {
        Some(base) => base.join(reference),
        None => Url::parse(reference),
    }
    .map_err(|e| UrlError::Parse(format!("{}: {}", reference, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    if strip_query {
        url.set_query(None);
    }

    if let Some(dir) = url.path().strip_suffix("index.html") {
        if dir.ends_with('/') {
            let dir = dir.to_string();
            url.set_path(&dir);
        }
    }

    Ok(CanonicalUrl(url))
}

/// Canonicalizes an absolute URL string
///
/// Shorthand for [`canonicalize`] without a base.
pub fn normalize_url(url_str: &str, strip_query: bool) -> Result<CanonicalUrl, UrlError> {
    canonicalize(url_str, None, strip_query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://docs.example.com/guide/intro").unwrap()
    }

    #[test]
    fn test_remove_fragment() {
        let result = normalize_url("https://example.com/page#section", true).unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_strip_query_when_enabled() {
        let result = normalize_url("https://example.com/page?b=2&a=1", true).unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_keep_query_when_disabled() {
        let result = normalize_url("https://example.com/page?b=2&a=1#x", false).unwrap();
        assert_eq!(result.as_str(), "https://example.com/page?b=2&a=1");
    }

    #[test]
    fn test_index_html_collapsed() {
        let result = normalize_url("https://example.com/guide/index.html", true).unwrap();
        assert_eq!(result.as_str(), "https://example.com/guide/");

        let root = normalize_url("https://example.com/index.html", true).unwrap();
        assert_eq!(root.as_str(), "https://example.com/");
    }

    #[test]
    fn test_similar_filename_not_collapsed() {
        let result = normalize_url("https://example.com/guide/myindex.html", true).unwrap();
        assert_eq!(result.as_str(), "https://example.com/guide/myindex.html");
    }

    #[test]
    fn test_lowercase_domain() {
        let result = normalize_url("https://EXAMPLE.COM/Page", true).unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_resolve_relative_reference() {
        let result = canonicalize("setup", Some(&base()), true).unwrap();
        assert_eq!(result.as_str(), "https://docs.example.com/guide/setup");

        let result = canonicalize("../api/", Some(&base()), true).unwrap();
        assert_eq!(result.as_str(), "https://docs.example.com/api/");

        let result = canonicalize("/guide/x#frag", Some(&base()), true).unwrap();
        assert_eq!(result.as_str(), "https://docs.example.com/guide/x");
    }

    #[test]
    fn test_fragment_only_reference_resolves_to_base() {
        let result = canonicalize("#section", Some(&base()), true).unwrap();
        assert_eq!(result.as_str(), "https://docs.example.com/guide/intro");
    }

    #[test]
    fn test_reject_non_document_schemes() {
        for href in [
            "javascript:void(0)",
            "mailto:someone@example.com",
            "tel:+1234567890",
            "data:text/html,<h1>x</h1>",
            "JavaScript:alert(1)",
        ] {
            let result = canonicalize(href, Some(&base()), true);
            assert!(
                matches!(result, Err(UrlError::InvalidScheme(_))),
                "expected {} to be rejected",
                href
            );
        }
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.com/page", true);
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_malformed_url() {
        assert!(normalize_url("not a url", true).is_err());
        assert!(canonicalize("   ", Some(&base()), true).is_err());
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let result = normalize_url("https://example.com", true).unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_canonicalization_is_idempotent() {
        let inputs = [
            "https://Docs.Example.com/guide/index.html?utm=1#top",
            "https://docs.example.com/guide/a/../b/./c",
            "http://docs.example.com:8080/guide/",
            "https://docs.example.com/guide/page?q=%20x",
            "https://docs.example.com/guide/caf%C3%A9",
        ];

        for strip in [true, false] {
            for input in inputs {
                let once = normalize_url(input, strip).unwrap();
                let twice = normalize_url(once.as_str(), strip).unwrap();
                assert_eq!(once, twice, "not idempotent for {} (strip={})", input, strip);
            }
        }
    }
}

//! Outbound link discovery
//!
//! Runs over the full, unstripped document so that links inside navigation
//! and sidebars still feed the frontier.

use crate::url::{canonicalize, CanonicalUrl, Scope};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts in-scope links from a parsed document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - Fragment-only references (same-page anchors)
/// - `javascript:`, `mailto:`, `tel:` and `data:` references
/// - Anything outside `scope` or pointing at an asset
///
/// # Returns
///
/// Canonical URLs in document order, each at most once
pub fn links_in_document(
    document: &Html,
    base_url: &Url,
    scope: &Scope,
    strip_query: bool,
) -> Vec<CanonicalUrl> {
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&anchor) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.trim_start().starts_with('#') {
            continue;
        }

        match canonicalize(href, Some(base_url), strip_query) {
            Ok(url) if scope.in_scope(&url) => {
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
            Ok(url) => tracing::trace!("Out of scope link: {}", url),
            Err(e) => tracing::trace!("Skipping link {:?}: {}", href, e),
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discover(markup: &str) -> Vec<String> {
        let base = Url::parse("https://docs.example.com/guide/intro").unwrap();
        let scope = Scope::new("https://docs.example.com/guide/").unwrap();
        let document = Html::parse_document(markup);
        links_in_document(&document, &base, &scope, true)
            .into_iter()
            .map(|u| u.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_relative_and_absolute_links() {
        let links = discover(
            r#"<body><a href="setup">Setup</a><a href="https://docs.example.com/guide/api/">API</a></body>"#,
        );
        assert_eq!(
            links,
            vec![
                "https://docs.example.com/guide/setup",
                "https://docs.example.com/guide/api/",
            ]
        );
    }

    #[test]
    fn test_links_in_navigation_are_discovered() {
        let links = discover(r#"<body><nav><a href="/guide/nav-target">x</a></nav><main></main></body>"#);
        assert_eq!(links, vec!["https://docs.example.com/guide/nav-target"]);
    }

    #[test]
    fn test_duplicates_removed_in_document_order() {
        let links = discover(
            r#"<a href="b">1</a><a href="a">2</a><a href="b#frag">3</a><a href="a/index.html">4</a><a href="a?x=1">5</a>"#,
        );
        assert_eq!(
            links,
            vec![
                "https://docs.example.com/guide/b",
                "https://docs.example.com/guide/a",
                "https://docs.example.com/guide/a/",
            ]
        );
    }

    #[test]
    fn test_out_of_scope_and_assets_filtered() {
        let links = discover(
            r#"
            <a href="/guide-old/x">old</a>
            <a href="https://other.example.com/guide/x">other host</a>
            <a href="/blog/">blog</a>
            <a href="diagram.png">image</a>
            <a href="manual.pdf">pdf</a>
            <a href="ok">ok</a>
            "#,
        );
        assert_eq!(links, vec!["https://docs.example.com/guide/ok"]);
    }

    #[test]
    fn test_special_links_skipped() {
        let links = discover(
            r##"
            <a href="javascript:void(0)">js</a>
            <a href="mailto:docs@example.com">mail</a>
            <a href="tel:+100">tel</a>
            <a href="#section">anchor</a>
            <a href="file.html" download>download</a>
            <a href="">empty</a>
            "##,
        );
        assert!(links.is_empty(), "unexpected links: {:?}", links);
    }
}

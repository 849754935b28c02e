//! Page content extraction
//!
//! This module turns decoded HTML into a [`PageDocument`]:
//! - Boilerplate (navigation, headers, sidebars, scripts, ...) is skipped
//! - The main content region is located by an ordered selector list
//! - The title is resolved from `h1`, then `<title>`, then a caller default
//! - Text blocks are grouped under their enclosing `h2` section
//!
//! Link discovery is separate and always sees the full document.

mod boilerplate;
mod content;
mod links;
mod sections;

pub use boilerplate::{is_boilerplate, within_boilerplate};
pub use content::{ContentRoot, ContentSelectors};
pub use links::links_in_document;

use crate::url::{CanonicalUrl, Scope};
use scraper::Html;
use thiserror::Error;
use url::Url;

/// Errors that make a page unusable
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Document is empty")]
    EmptyDocument,

    #[error("Invalid base URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("Invalid selector {0}")]
    Selector(String),
}

/// Kind of a text block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    ListItem,
    /// Whitespace-preserving code or preformatted text
    Preformatted { language: Option<String> },
    Blockquote,
    /// Text node directly under a sectioning wrapper
    BareText,
}

/// One unit of page text with its section context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    /// Enclosing section headings (currently the `h2` text)
    pub heading_path: Vec<String>,
    /// 0-based ordinal of the enclosing section within the page
    pub section_index: usize,
    pub kind: BlockKind,
    /// 0-based position within the page, strictly increasing
    pub order_index: usize,
    pub text: String,
}

/// Structured content of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    pub url: String,
    pub title: String,
    pub blocks: Vec<TextBlock>,
    /// RFC 3339 timestamp from the response's Last-Modified header
    pub last_modified: Option<String>,
}

impl PageDocument {
    /// Groups consecutive blocks that belong to the same section
    ///
    /// Sections are told apart by `section_index`, so two sections with the
    /// same heading text stay separate.
    ///
    /// # Returns
    ///
    /// `(heading_path, blocks)` pairs in page order
    pub fn sections(&self) -> Vec<(&[String], &[TextBlock])> {
        let mut sections = Vec::new();
        let mut start = 0;

        for index in 1..=self.blocks.len() {
            let boundary = index == self.blocks.len()
                || self.blocks[index].section_index != self.blocks[start].section_index;
            if boundary {
                sections.push((
                    self.blocks[start].heading_path.as_slice(),
                    &self.blocks[start..index],
                ));
                start = index;
            }
        }

        sections
    }
}

/// HTML extractor with precompiled selectors
#[derive(Debug)]
pub struct Extractor {
    selectors: ContentSelectors,
}

impl Extractor {
    /// Creates an extractor
    ///
    /// # Returns
    ///
    /// * `Ok(Extractor)` - Ready to extract pages
    /// * `Err(ExtractError)` - A built-in selector failed to compile
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            selectors: ContentSelectors::new()?,
        })
    }

    /// Extracts the title and sectioned text blocks of a page
    ///
    /// # Arguments
    ///
    /// * `markup` - Decoded HTML
    /// * `base_url` - Absolute URL of the page
    /// * `default_title` - Title used when neither `h1` nor `<title>` has text
    ///
    /// # Returns
    ///
    /// * `Ok(PageDocument)` - The page's structured content
    /// * `Err(ExtractError)` - The markup is empty or the base URL is invalid
    ///
    /// # Example
    ///
    /// ```
    /// use doccrawl::extract::Extractor;
    ///
    /// let html = "<main><h1>Guide</h1><h2>Install</h2><p>Run the installer.</p></main>";
    /// let page = Extractor::new()
    ///     .unwrap()
    ///     .extract(html, "https://docs.example.com/guide/", None)
    ///     .unwrap();
    ///
    /// assert_eq!(page.title, "Guide");
    /// assert_eq!(page.blocks[0].heading_path, vec!["Install".to_string()]);
    /// ```
    pub fn extract(
        &self,
        markup: &str,
        base_url: &str,
        default_title: Option<&str>,
    ) -> Result<PageDocument, ExtractError> {
        let base = parse_base_url(base_url)?;
        if markup.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let document = Html::parse_document(markup);
        let (root, root_kind) = self.selectors.content_root(&document);
        tracing::trace!("Content root for {}: {:?}", base, root_kind);

        let title = self.selectors.title(&document, root, default_title);
        let blocks = sections::collect_blocks(root);

        Ok(PageDocument {
            url: base.to_string(),
            title,
            blocks,
            last_modified: None,
        })
    }
}

/// Extracts a page with a fresh [`Extractor`] and no default title
pub fn extract(markup: &str, base_url: &str) -> Result<PageDocument, ExtractError> {
    Extractor::new()?.extract(markup, base_url, None)
}

/// Discovers in-scope outbound links of a page
///
/// # Arguments
///
/// * `markup` - Decoded HTML (not stripped of boilerplate)
/// * `base_url` - Absolute URL of the page, for resolving relative links
/// * `scope` - Crawl scope used to filter candidates
/// * `strip_query` - Whether query strings are dropped during canonicalization
///
/// # Returns
///
/// * `Ok(Vec<CanonicalUrl>)` - Unique in-scope links in document order
/// * `Err(ExtractError)` - The base URL is invalid
pub fn discover_links(
    markup: &str,
    base_url: &str,
    scope: &Scope,
    strip_query: bool,
) -> Result<Vec<CanonicalUrl>, ExtractError> {
    let base = parse_base_url(base_url)?;
    let document = Html::parse_document(markup);
    let links = links_in_document(&document, &base, scope, strip_query);
    tracing::trace!("Discovered {} in-scope links on {}", links.len(), base);
    Ok(links)
}

/// Collapses runs of whitespace to single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_base_url(base_url: &str) -> Result<Url, ExtractError> {
    let url = Url::parse(base_url).map_err(|e| ExtractError::InvalidBaseUrl {
        url: base_url.to_string(),
        message: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(ExtractError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: "not a hierarchical URL".to_string(),
        });
    }

    Ok(url)
}

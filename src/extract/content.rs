//! Main-content region selection and title resolution

use crate::extract::boilerplate::within_boilerplate;
use crate::extract::{collapse_whitespace, ExtractError};
use scraper::{ElementRef, Html, Selector};

/// Candidate content-root selectors, highest priority first
const CONTENT_ROOT_SELECTORS: &[&str] = &[
    r#"div[itemprop="articleBody"]"#,
    "article",
    "main",
    r#"[role="main"]"#,
    "div.markdown",
    "div.md-content",
    "div.content",
    "div#content",
    "div.document",
];

/// Where the content root came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRoot {
    /// Matched `CONTENT_ROOT_SELECTORS[index]`
    Selector(usize),
    Body,
    Document,
}

/// Compiled selectors for content-root and title lookup
#[derive(Debug)]
pub struct ContentSelectors {
    roots: Vec<Selector>,
    body: Selector,
    title: Selector,
    h1: Selector,
}

impl ContentSelectors {
    pub fn new() -> Result<Self, ExtractError> {
        let roots = CONTENT_ROOT_SELECTORS
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            roots,
            body: parse_selector("body")?,
            title: parse_selector("title")?,
            h1: parse_selector("h1")?,
        })
    }

    /// Picks the main content element
    ///
    /// Selectors are tried in priority order; within a selector the first
    /// match outside boilerplate wins. Falls back to `<body>`, then to the
    /// document root.
    pub fn content_root<'a>(&self, document: &'a Html) -> (ElementRef<'a>, ContentRoot) {
        for (index, selector) in self.roots.iter().enumerate() {
            if let Some(element) = document
                .select(selector)
                .find(|element| !within_boilerplate(element))
            {
                return (element, ContentRoot::Selector(index));
            }
        }

        match document.select(&self.body).next() {
            Some(body) => (body, ContentRoot::Body),
            None => (document.root_element(), ContentRoot::Document),
        }
    }

    /// Resolves the page title
    ///
    /// First non-empty `h1` inside the content root, then the `<title>`
    /// element, then `default_title`, then the empty string.
    pub fn title(&self, document: &Html, root: ElementRef, default_title: Option<&str>) -> String {
        let heading = root
            .select(&self.h1)
            .filter(|h1| !within_boilerplate(h1))
            .map(|h1| collapse_whitespace(&h1.text().collect::<String>()))
            .find(|text| !text.is_empty());
        if let Some(heading) = heading {
            return heading;
        }

        let title = document
            .select(&self.title)
            .map(|title| collapse_whitespace(&title.text().collect::<String>()))
            .find(|text| !text.is_empty());
        if let Some(title) = title {
            return title;
        }

        default_title
            .map(collapse_whitespace)
            .unwrap_or_default()
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector)
        .map_err(|e| ExtractError::Selector(format!("{}: {:?}", selector, e)))
}

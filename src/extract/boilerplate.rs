//! Detection of navigation, chrome and other non-content elements

use scraper::ElementRef;

/// Elements that never carry page content
const BOILERPLATE_TAGS: &[&str] = &[
    "nav", "header", "footer", "aside", "script", "style", "noscript", "form", "svg", "template",
    "iframe", "button",
];

/// Class-name words that mark doc-site chrome
///
/// Matched against each `-`/`_`-separated part of every class token, so
/// `md-sidebar` and `toc_wrapper` match while `header-anchor` or `loading`
/// do not.
const BOILERPLATE_CLASS_WORDS: &[&str] = &[
    "sidebar",
    "toc",
    "tableofcontents",
    "breadcrumb",
    "breadcrumbs",
    "pagination",
    "menu",
    "ad",
    "ads",
    "advert",
    "advertisement",
    "cookie",
    "cookies",
    "newsletter",
];

/// Returns true if the element itself is boilerplate
pub fn is_boilerplate(element: &ElementRef) -> bool {
    let value = element.value();
    if BOILERPLATE_TAGS.contains(&value.name()) {
        return true;
    }

    value.classes().any(is_boilerplate_class)
}

/// Returns true if the element or any of its ancestors is boilerplate
pub fn within_boilerplate(element: &ElementRef) -> bool {
    if is_boilerplate(element) {
        return true;
    }

    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_boilerplate(&ancestor))
}

fn is_boilerplate_class(class: &str) -> bool {
    let class = class.to_ascii_lowercase();
    if class == "table-of-contents" {
        return true;
    }

    class
        .split(|c| c == '-' || c == '_')
        .any(|part| BOILERPLATE_CLASS_WORDS.contains(&part))
}

//! URL handling module for doccrawl
//!
//! This module provides URL canonicalization, the crawl scope filter,
//! asset detection, and the origin keys used for per-host robots policy.

mod normalize;
mod scope;

pub use normalize::{canonicalize, normalize_url, CanonicalUrl};
pub use scope::{in_scope, is_asset, origin_of, Scope};

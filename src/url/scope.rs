use crate::url::CanonicalUrl;
use crate::UrlError;
use url::Url;

/// File extensions that identify non-document assets
const ASSET_EXTENSIONS: &[&str] = &[
    "pdf", "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "bmp", "css", "js", "mjs", "map",
    "json", "xml", "zip", "gz", "tgz", "tar", "bz2", "7z", "rar", "mp3", "mp4", "webm", "ogg",
    "wav", "mov", "avi", "woff", "woff2", "ttf", "otf", "eot", "exe", "dmg", "whl",
];

/// The bounded subtree of a site that a crawl is allowed to visit
///
/// A URL is in scope when its scheme, host and port equal the root's and its
/// path lies under the root path. The root path always ends with `/`, so a
/// root of `/guide` behaves like `/guide/` and never matches `/guide-old/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    scheme: String,
    host: String,
    port: Option<u16>,
    root_path: String,
}

impl Scope {
    /// Creates a scope from a root URL string
    ///
    /// # Arguments
    ///
    /// * `root` - Absolute http(s) URL whose path is the scope prefix
    ///
    /// # Returns
    ///
    /// * `Ok(Scope)` - The scope rooted at `root`
    /// * `Err(UrlError)` - `root` is not an absolute http(s) URL with a host
    ///
    /// # Examples
    ///
    /// ```
    /// use doccrawl::url::{normalize_url, Scope};
    ///
    /// let scope = Scope::new("https://docs.example.com/guide").unwrap();
    /// assert_eq!(scope.root_path(), "/guide/");
    ///
    /// let inside = normalize_url("https://docs.example.com/guide/x", true).unwrap();
    /// let sibling = normalize_url("https://docs.example.com/guide-old/x", true).unwrap();
    /// assert!(scope.in_scope(&inside));
    /// assert!(!scope.in_scope(&sibling));
    /// ```
    pub fn new(root: &str) -> Result<Self, UrlError> {
        let url = Url::parse(root.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", root, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        let host = extract_host(&url).ok_or(UrlError::MissingDomain)?;

        let mut root_path = url.path().to_string();
        if !root_path.ends_with('/') {
            root_path.push('/');
        }

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            port: url.port_or_known_default(),
            root_path,
        })
    }

    /// Returns the scope's path prefix (always ends with `/`)
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Returns the scope's origin (`scheme://host[:port]`)
    pub fn origin(&self) -> String {
        format_origin(&self.scheme, &self.host, self.port)
    }

    /// Checks whether a canonical URL falls inside this scope
    ///
    /// The root path itself without its trailing slash (`/guide` for a
    /// `/guide/` root) counts as inside. Asset URLs are never in scope.
    ///
    /// # Arguments
    ///
    /// * `candidate` - The canonical URL to test
    ///
    /// # Returns
    ///
    /// * `true` - If the candidate may be crawled
    /// * `false` - If it is on another origin, outside the prefix, or an asset
    pub fn in_scope(&self, candidate: &CanonicalUrl) -> bool {
        let url = candidate.as_url();

        if url.scheme() != self.scheme
            || extract_host(url).as_deref() != Some(self.host.as_str())
            || url.port_or_known_default() != self.port
        {
            return false;
        }

        let path = url.path();
        let under_root = path.starts_with(&self.root_path)
            || path == &self.root_path[..self.root_path.len() - 1];

        under_root && !is_asset(url)
    }
}

/// Checks whether a URL in `scope` passes the scope filter
///
/// Free-function form of [`Scope::in_scope`].
pub fn in_scope(candidate: &CanonicalUrl, scope: &Scope) -> bool {
    scope.in_scope(candidate)
}

/// Checks whether the URL's last path segment carries an asset extension
///
/// # Examples
///
/// ```
/// use doccrawl::url::is_asset;
/// use url::Url;
///
/// assert!(is_asset(&Url::parse("https://example.com/img/logo.PNG").unwrap()));
/// assert!(!is_asset(&Url::parse("https://example.com/guide/setup.html").unwrap()));
/// ```
pub fn is_asset(url: &Url) -> bool {
    let segment = url.path().rsplit('/').next().unwrap_or("");
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            ASSET_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

/// Returns the origin key used for per-host robots policy
///
/// # Arguments
///
/// * `url` - Any absolute URL
///
/// # Returns
///
/// * `Some(String)` - `scheme://host[:port]`, port omitted when it is the scheme default
/// * `None` - If the URL has no host
pub fn origin_of(url: &Url) -> Option<String> {
    let host = extract_host(url)?;
    Some(format_origin(url.scheme(), &host, url.port_or_known_default()))
}

fn extract_host(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

fn format_origin(scheme: &str, host: &str, port: Option<u16>) -> String {
    let default_port = match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    };

    match port {
        Some(port) if Some(port) != default_port => format!("{}://{}:{}", scheme, host, port),
        _ => format!("{}://{}", scheme, host),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::normalize_url;

    fn canonical(url: &str) -> CanonicalUrl {
        normalize_url(url, true).unwrap()
    }

    #[test]
    fn test_root_path_gets_trailing_slash() {
        let scope = Scope::new("https://docs.example.com/guide").unwrap();
        assert_eq!(scope.root_path(), "/guide/");

        let scope = Scope::new("https://docs.example.com/guide/").unwrap();
        assert_eq!(scope.root_path(), "/guide/");

        let scope = Scope::new("https://docs.example.com").unwrap();
        assert_eq!(scope.root_path(), "/");
    }

    #[test]
    fn test_in_scope_prefix() {
        let scope = Scope::new("https://docs.example.com/guide/").unwrap();

        assert!(scope.in_scope(&canonical("https://docs.example.com/guide/x")));
        assert!(scope.in_scope(&canonical("https://docs.example.com/guide/")));
        assert!(scope.in_scope(&canonical("https://docs.example.com/guide")));
        assert!(scope.in_scope(&canonical("https://DOCS.example.com/guide/deep/page")));
    }

    #[test]
    fn test_sibling_prefix_rejected() {
        let scope = Scope::new("https://docs.example.com/guide/").unwrap();
        assert!(!scope.in_scope(&canonical("https://docs.example.com/guide-old/x")));
        assert!(!scope.in_scope(&canonical("https://docs.example.com/guides")));
        assert!(!scope.in_scope(&canonical("https://docs.example.com/")));
    }

    #[test]
    fn test_other_origin_rejected() {
        let scope = Scope::new("https://docs.example.com/guide/").unwrap();
        assert!(!scope.in_scope(&canonical("https://other.example.com/guide/x")));
        assert!(!scope.in_scope(&canonical("http://docs.example.com/guide/x")));
        assert!(!scope.in_scope(&canonical("https://docs.example.com:8443/guide/x")));
    }

    #[test]
    fn test_explicit_default_port_matches() {
        let scope = Scope::new("https://docs.example.com/guide/").unwrap();
        assert!(scope.in_scope(&canonical("https://docs.example.com:443/guide/x")));
    }

    #[test]
    fn test_assets_rejected() {
        let scope = Scope::new("https://docs.example.com/guide/").unwrap();
        for asset in [
            "https://docs.example.com/guide/manual.pdf",
            "https://docs.example.com/guide/img/diagram.svg",
            "https://docs.example.com/guide/static/app.js",
            "https://docs.example.com/guide/static/theme.CSS",
            "https://docs.example.com/guide/files/bundle.zip",
        ] {
            assert!(!scope.in_scope(&canonical(asset)), "{} should be rejected", asset);
        }
        assert!(scope.in_scope(&canonical("https://docs.example.com/guide/page.html")));
        assert!(scope.in_scope(&canonical("https://docs.example.com/guide/v1.2/")));
    }

    #[test]
    fn test_hidden_file_is_not_an_asset() {
        let url = Url::parse("https://example.com/guide/.js").unwrap();
        assert!(!is_asset(&url));
    }

    #[test]
    fn test_origin_of() {
        let url = Url::parse("https://Example.com/path").unwrap();
        assert_eq!(origin_of(&url), Some("https://example.com".to_string()));

        let url = Url::parse("http://127.0.0.1:8080/x").unwrap();
        assert_eq!(origin_of(&url), Some("http://127.0.0.1:8080".to_string()));

        let url = Url::parse("https://example.com:443/").unwrap();
        assert_eq!(origin_of(&url), Some("https://example.com".to_string()));
    }

    #[test]
    fn test_scope_origin() {
        let scope = Scope::new("http://localhost:3000/docs").unwrap();
        assert_eq!(scope.origin(), "http://localhost:3000");
    }

    #[test]
    fn test_invalid_root() {
        assert!(Scope::new("not a url").is_err());
        assert!(matches!(
            Scope::new("ftp://example.com/").unwrap_err(),
            UrlError::InvalidScheme(_)
        ));
    }
}

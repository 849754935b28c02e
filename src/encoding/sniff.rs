//! Charset declarations found in markup and transport headers

/// Number of leading bytes scanned for a `<meta>` charset declaration
pub const META_SCAN_LIMIT: usize = 8192;

/// Finds a charset declared by a `<meta>` tag in the head of the document
///
/// Recognizes both `<meta charset="...">` and
/// `<meta http-equiv="Content-Type" content="text/html; charset=...">`.
/// Only the first [`META_SCAN_LIMIT`] bytes are examined.
pub fn meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_SCAN_LIMIT)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        let tag_start = &rest[start + "<meta".len()..];
        let tag_end = tag_start.find('>').unwrap_or(tag_start.len());
        let tag = &tag_start[..tag_end];

        if let Some(label) = charset_param(tag) {
            return Some(label);
        }

        rest = &tag_start[tag_end..];
    }

    None
}

/// Extracts the `charset` parameter of a Content-Type header value
///
/// # Examples
///
/// ```
/// use doccrawl::encoding::header_charset;
///
/// assert_eq!(header_charset("text/html; charset=\"ISO-8859-1\""), Some("iso-8859-1".to_string()));
/// assert_eq!(header_charset("text/html"), None);
/// ```
pub fn header_charset(content_type: &str) -> Option<String> {
    charset_param(&content_type.to_ascii_lowercase())
}

/// Returns true for `text/*` media types, which default to ISO-8859-1 in HTTP/1.1
pub fn is_text_media_type(content_type: &str) -> bool {
    content_type
        .trim_start()
        .get(..5)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("text/"))
}

/// Reads the value following `charset` (then `=`) in already-lowercased input
fn charset_param(haystack: &str) -> Option<String> {
    let mut rest = haystack;
    while let Some(pos) = rest.find("charset") {
        let after = rest[pos + "charset".len()..].trim_start();
        if let Some(value) = after.strip_prefix('=') {
            let value = value.trim_start().trim_start_matches(['"', '\'']);
            let label: String = value
                .chars()
                .take_while(|c| !c.is_whitespace() && !matches!(c, '"' | '\'' | ';' | '>' | '/'))
                .collect();
            if !label.is_empty() {
                return Some(label);
            }
        }
        rest = &rest[pos + "charset".len()..];
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_charset_attribute() {
        let html = br#"<html><head><meta charset="windows-1252"><title>x</title>"#;
        assert_eq!(meta_charset(html), Some("windows-1252".to_string()));
    }

    #[test]
    fn test_meta_charset_unquoted_uppercase() {
        let html = b"<HTML><HEAD><META CHARSET=Shift_JIS></HEAD>";
        assert_eq!(meta_charset(html), Some("shift_jis".to_string()));
    }

    #[test]
    fn test_meta_http_equiv() {
        let html = br#"<meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-2">"#;
        assert_eq!(meta_charset(html), Some("iso-8859-2".to_string()));
    }

    #[test]
    fn test_meta_without_charset_is_skipped() {
        let html = br#"<meta name="viewport" content="width=device-width"><meta charset='koi8-r'>"#;
        assert_eq!(meta_charset(html), Some("koi8-r".to_string()));
    }

    #[test]
    fn test_meta_beyond_scan_limit_ignored() {
        let mut html = vec![b' '; META_SCAN_LIMIT];
        html.extend_from_slice(br#"<meta charset="windows-1252">"#);
        assert_eq!(meta_charset(&html), None);
    }

    #[test]
    fn test_charset_outside_meta_ignored() {
        let html = b"<p>set charset=latin1 in your editor</p>";
        assert_eq!(meta_charset(html), None);
    }

    #[test]
    fn test_header_charset() {
        assert_eq!(
            header_charset("text/html; charset=UTF-8"),
            Some("utf-8".to_string())
        );
        assert_eq!(
            header_charset("text/html;charset='euc-jp'"),
            Some("euc-jp".to_string())
        );
        assert_eq!(header_charset("text/html; charset="), None);
        assert_eq!(header_charset("application/xhtml+xml"), None);
    }

    #[test]
    fn test_is_text_media_type() {
        assert!(is_text_media_type("text/html"));
        assert!(is_text_media_type("TEXT/plain; format=flowed"));
        assert!(!is_text_media_type("application/xhtml+xml"));
        assert!(!is_text_media_type("te"));
    }
}

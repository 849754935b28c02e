//! Byte-to-text decoding for fetched pages
//!
//! Page bytes are decoded by walking a fixed, prioritized list of encoding
//! sources. The first source that yields a clean decode wins:
//!
//! 1. Byte-order mark
//! 2. `<meta>` charset declaration in the first 8192 bytes
//! 3. Strict UTF-8
//! 4. Injected statistical detector
//! 5. Content-Type `charset` parameter
//! 6. Transport default for `text/*` without a charset (windows-1252)
//!
//! If none applies, the bytes are decoded as UTF-8 with replacement
//! characters, so decoding never fails.

mod detector;
mod sniff;

pub use detector::{ChardetngDetector, CharsetDetector};
pub use sniff::{header_charset, is_text_media_type, meta_charset, META_SCAN_LIMIT};

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::fmt;

/// Where the resolved encoding came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingSource {
    Bom,
    MetaCharset,
    Utf8,
    Detector,
    HeaderCharset,
    TransportDefault,
    /// Lossy UTF-8 after every other source failed
    Fallback,
}

impl EncodingSource {
    /// Resolution order, highest priority first
    pub const CASCADE: [EncodingSource; 6] = [
        EncodingSource::Bom,
        EncodingSource::MetaCharset,
        EncodingSource::Utf8,
        EncodingSource::Detector,
        EncodingSource::HeaderCharset,
        EncodingSource::TransportDefault,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bom => "bom",
            Self::MetaCharset => "meta",
            Self::Utf8 => "utf-8",
            Self::Detector => "detector",
            Self::HeaderCharset => "header",
            Self::TransportDefault => "transport-default",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for EncodingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded page text plus the encoding that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
    pub source: EncodingSource,
}

impl DecodedText {
    /// WHATWG name of the resolved encoding (e.g. `UTF-8`, `windows-1252`)
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }
}

/// Runs the encoding cascade with an optional injected detector
pub struct EncodingResolver {
    detector: Option<Box<dyn CharsetDetector>>,
}

impl EncodingResolver {
    /// Creates a resolver that uses chardetng as its detector
    pub fn new() -> Self {
        Self::with_detector(Box::new(ChardetngDetector))
    }

    /// Creates a resolver with a custom detector
    pub fn with_detector(detector: Box<dyn CharsetDetector>) -> Self {
        Self {
            detector: Some(detector),
        }
    }

    /// Creates a resolver that skips statistical detection
    pub fn without_detector() -> Self {
        Self { detector: None }
    }

    /// Decodes `bytes` using the first encoding source that applies
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw response body
    /// * `content_type` - The response's Content-Type header, if any
    ///
    /// # Returns
    ///
    /// The decoded text. This never fails; the last resort is lossy UTF-8.
    pub fn decode(&self, bytes: &[u8], content_type: Option<&str>) -> DecodedText {
        for source in EncodingSource::CASCADE {
            if let Some(decoded) = self.try_source(source, bytes, content_type) {
                return decoded;
            }
        }

        let (text, _) = UTF_8.decode_without_bom_handling(bytes);
        DecodedText {
            text: text.into_owned(),
            encoding: UTF_8,
            source: EncodingSource::Fallback,
        }
    }

    fn try_source(
        &self,
        source: EncodingSource,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Option<DecodedText> {
        match source {
            EncodingSource::Bom => {
                let (encoding, _) = Encoding::for_bom(bytes)?;
                // A BOM is authoritative even if the rest of the body is malformed
                let (text, encoding, _) = encoding.decode(bytes);
                Some(DecodedText {
                    text: text.into_owned(),
                    encoding,
                    source,
                })
            }
            EncodingSource::MetaCharset => {
                let label = meta_charset(bytes)?;
                let encoding = Encoding::for_label(label.as_bytes())?.output_encoding();
                decode_clean(bytes, encoding, source)
            }
            EncodingSource::Utf8 => decode_clean(bytes, UTF_8, source),
            EncodingSource::Detector => {
                let encoding = self.detector.as_ref()?.guess(bytes)?;
                decode_clean(bytes, encoding, source)
            }
            EncodingSource::HeaderCharset => {
                let label = header_charset(content_type?)?;
                let encoding = Encoding::for_label(label.as_bytes())?;
                decode_clean(bytes, encoding, source)
            }
            EncodingSource::TransportDefault => {
                let content_type = content_type?;
                if is_text_media_type(content_type) && header_charset(content_type).is_none() {
                    decode_clean(bytes, WINDOWS_1252, source)
                } else {
                    None
                }
            }
            EncodingSource::Fallback => None,
        }
    }
}

impl Default for EncodingResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EncodingResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodingResolver")
            .field("detector", &self.detector.is_some())
            .finish()
    }
}

/// Decodes `bytes` with `encoding`, returning None on any malformed sequence
fn decode_clean(
    bytes: &[u8],
    encoding: &'static Encoding,
    source: EncodingSource,
) -> Option<DecodedText> {
    let text = encoding.decode_without_bom_handling_and_without_replacement(bytes)?;
    Some(DecodedText {
        text: text.into_owned(),
        encoding,
        source,
    })
}

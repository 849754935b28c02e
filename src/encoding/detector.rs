use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Statistical charset detection strategy
///
/// Detectors only guess; the cascade accepts a guess only when the bytes
/// decode under it without malformed sequences.
pub trait CharsetDetector: Send + Sync {
    /// Returns the most likely encoding of `bytes`, if the detector has one
    fn guess(&self, bytes: &[u8]) -> Option<&'static Encoding>;
}

/// chardetng-backed detector
#[derive(Debug, Clone, Copy, Default)]
pub struct ChardetngDetector;

impl CharsetDetector for ChardetngDetector {
    fn guess(&self, bytes: &[u8]) -> Option<&'static Encoding> {
        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        Some(detector.guess(None, true))
    }
}

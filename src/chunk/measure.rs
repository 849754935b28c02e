//! Size measurement strategies for chunking

use crate::chunk::ChunkError;
use serde::Deserialize;
use std::fmt;
use tiktoken_rs::CoreBPE;

/// Unit a [`Measure`] counts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureUnit {
    Tokens,
    Chars,
}

impl MeasureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tokens => "tokens",
            Self::Chars => "chars",
        }
    }
}

impl fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text size policy used by the chunkers
///
/// Implementations must be deterministic: the same text always measures the
/// same.
pub trait Measure: Send + Sync {
    /// Size of `text` in this measure's unit
    fn measure(&self, text: &str) -> usize;

    /// Trailing slice of `text` whose size is at most `amount`
    fn tail(&self, text: &str, amount: usize) -> String;

    fn unit(&self) -> MeasureUnit;
}

/// Counts Unicode scalar values
#[derive(Debug, Clone, Copy, Default)]
pub struct CharMeasure;

impl Measure for CharMeasure {
    fn measure(&self, text: &str) -> usize {
        text.chars().count()
    }

    fn tail(&self, text: &str, amount: usize) -> String {
        let total = text.chars().count();
        text.chars().skip(total.saturating_sub(amount)).collect()
    }

    fn unit(&self) -> MeasureUnit {
        MeasureUnit::Chars
    }
}

/// Counts `cl100k_base` BPE tokens
pub struct TokenMeasure {
    bpe: CoreBPE,
}

impl TokenMeasure {
    /// Loads the `cl100k_base` encoding
    pub fn cl100k() -> Result<Self, ChunkError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(ChunkError::Tokenizer)?;
        Ok(Self { bpe })
    }
}

impl Measure for TokenMeasure {
    fn measure(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    fn tail(&self, text: &str, amount: usize) -> String {
        let tokens = self.bpe.encode_with_special_tokens(text);
        if tokens.len() <= amount {
            return text.to_string();
        }

        // A token boundary can split a multi-byte character; move forward
        // until the slice decodes.
        let mut start = tokens.len() - amount;
        while start < tokens.len() {
            if let Ok(tail) = self.bpe.decode(tokens[start..].to_vec()) {
                return tail;
            }
            start += 1;
        }

        String::new()
    }

    fn unit(&self) -> MeasureUnit {
        MeasureUnit::Tokens
    }
}

impl fmt::Debug for TokenMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenMeasure(cl100k_base)")
    }
}

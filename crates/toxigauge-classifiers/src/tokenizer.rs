//! Text normalization and fixed-length encoding
//!
//! Text is lower-cased, stripped of everything but ASCII letters, digits and
//! separators, split on separators, truncated to `max_len` tokens, mapped to
//! vocabulary ids and right-padded with the padding id. Encoding never fails.
//!
//! Separators are Unicode whitespace plus the ASCII information separators
//! U+001C..=U+001F, which the training tokenizer also split on.

use crate::vocab::Vocabulary;
use regex::Regex;
use std::sync::Arc;
use toxigauge_core::{EncodedSequence, Error, Result};

/// Default sequence length the model was trained with
pub const DEFAULT_MAX_LEN: usize = 150;

const STRIP_PATTERN: &str = r"[^a-zA-Z0-9\s\x1C-\x1F]";

fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

fn split_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_separator).filter(|t| !t.is_empty())
}

/// Encodes raw text into an [`EncodedSequence`] of exactly `max_len` ids
#[derive(Debug, Clone)]
pub struct TextEncoder {
    vocab: Arc<Vocabulary>,
    max_len: usize,
    strip: Regex,
}

impl TextEncoder {
    /// Create an encoder with the default sequence length
    pub fn new(vocab: Arc<Vocabulary>) -> Result<Self> {
        Self::with_max_len(vocab, DEFAULT_MAX_LEN)
    }

    /// Create an encoder producing sequences of `max_len` ids
    pub fn with_max_len(vocab: Arc<Vocabulary>, max_len: usize) -> Result<Self> {
        let strip = Regex::new(STRIP_PATTERN)
            .map_err(|e| Error::internal(format!("Failed to build text filter: {}", e)))?;

        Ok(Self {
            vocab,
            max_len,
            strip,
        })
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    /// Lower-case and strip special characters
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        self.strip.replace_all(&lowered, "").into_owned()
    }

    /// Normalized tokens, before truncation
    pub fn tokens(&self, text: &str) -> Vec<String> {
        split_tokens(&self.normalize(text))
            .map(str::to_string)
            .collect()
    }

    /// Encode `text` into exactly `max_len` vocabulary ids
    pub fn encode(&self, text: &str) -> EncodedSequence {
        let normalized = self.normalize(text);

        let mut ids = Vec::with_capacity(self.max_len);
        let mut unknown = 0usize;
        for token in split_tokens(&normalized).take(self.max_len) {
            let id = match self.vocab.get(token) {
                Some(id) => id,
                None => {
                    unknown += 1;
                    self.vocab.unk_id()
                }
            };
            ids.push(id);
        }

        let content = ids.len();
        ids.resize(self.max_len, self.vocab.pad_id());

        tracing::debug!(
            tokens = content,
            unknown,
            padding = self.max_len - content,
            "Encoded text"
        );

        EncodedSequence::new(ids)
    }
}

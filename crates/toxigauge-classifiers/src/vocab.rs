//! Word-level vocabulary used by the text encoder

use std::collections::HashMap;
use std::path::Path;
use toxigauge_core::{Error, Result};

/// Reserved token for words missing from the vocabulary
pub const UNK_TOKEN: &str = "<UNK>";

/// Reserved token used to right-pad short sequences
pub const PAD_TOKEN: &str = "<PAD>";

/// Mapping from token string to integer id.
///
/// The ids of the two reserved tokens are resolved once when the vocabulary
/// is built, so lookups never have to touch the map for them.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    tokens: HashMap<String, u32>,
    unk_id: u32,
    pad_id: u32,
}

impl Vocabulary {
    /// Build a vocabulary, failing if a reserved token is missing
    pub fn new(tokens: HashMap<String, u32>) -> Result<Self> {
        let unk_id = *tokens.get(UNK_TOKEN).ok_or_else(|| {
            Error::vocabulary(format!("reserved token {UNK_TOKEN} is missing"))
        })?;
        let pad_id = *tokens.get(PAD_TOKEN).ok_or_else(|| {
            Error::vocabulary(format!("reserved token {PAD_TOKEN} is missing"))
        })?;

        Ok(Self {
            tokens,
            unk_id,
            pad_id,
        })
    }

    /// Parse a JSON object of `token -> id`
    pub fn from_json(json: &str) -> Result<Self> {
        let tokens: HashMap<String, u32> = serde_json::from_str(json)?;
        Self::new(tokens)
    }

    /// Load a JSON vocabulary file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to read vocabulary");
            e
        })?;

        let vocab = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            size = vocab.len(),
            "Loaded vocabulary"
        );
        Ok(vocab)
    }

    /// Id of `token`, falling back to the unknown id
    pub fn id(&self, token: &str) -> u32 {
        self.get(token).unwrap_or(self.unk_id)
    }

    /// Id of `token` if present
    pub fn get(&self, token: &str) -> Option<u32> {
        self.tokens.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains_key(token)
    }

    pub fn unk_id(&self) -> u32 {
        self.unk_id
    }

    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    /// Number of entries, reserved tokens included
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Largest id in the vocabulary
    pub fn max_id(&self) -> u32 {
        self.tokens.values().copied().max().unwrap_or(0)
    }
}

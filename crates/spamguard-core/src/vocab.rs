//! Word → index lookup table used to encode text for the classifier.
//!
//! The table is produced alongside the model at training time and shipped as a
//! JSON document:
//!
//! ```json
//! { "pad": 0, "start": 1, "unknown": 2, "lookup": { "free": 7, "money": 8 } }
//! ```
//!
//! It is loaded once at startup and shared read-only across requests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("vocabulary file not found: {0}")]
    NotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid vocabulary json: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk layout of the vocabulary file.
#[derive(Deserialize)]
struct VocabFile {
    pad: i64,
    start: i64,
    unknown: i64,
    lookup: HashMap<String, i64>,
}

/// Immutable lowercase-word → index table with reserved indices.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    lookup: HashMap<String, i64>,
    pad: i64,
    start: i64,
    unknown: i64,
}

impl Vocabulary {
    pub fn new(lookup: HashMap<String, i64>, pad: i64, start: i64, unknown: i64) -> Self {
        Self {
            lookup,
            pad,
            start,
            unknown,
        }
    }

    /// Parse a vocabulary from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, VocabError> {
        let file: VocabFile = serde_json::from_str(json)?;
        Ok(Self::new(file.lookup, file.pad, file.start, file.unknown))
    }

    /// Load a vocabulary JSON file from disk.
    pub fn load(path: &Path) -> Result<Self, VocabError> {
        if !path.exists() {
            return Err(VocabError::NotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        let vocab = Self::from_json_str(&json)?;
        info!(
            words = vocab.len(),
            pad = vocab.pad,
            unknown = vocab.unknown,
            path = %path.display(),
            "loaded vocabulary"
        );
        Ok(vocab)
    }

    /// Index for `token`, or [`unknown`](Self::unknown) when the token is absent.
    ///
    /// A token mapped to `0` counts as absent: the tables this service consumes
    /// were written for a `lookup[token] || UNKNOWN` fallback, which treats a
    /// zero index as missing.
    pub fn index_of(&self, token: &str) -> i64 {
        match self.lookup.get(token) {
            Some(&idx) if idx != 0 => idx,
            _ => self.unknown,
        }
    }

    pub fn pad(&self) -> i64 {
        self.pad
    }

    /// Start-of-sequence marker. Defined by the table but never emitted by
    /// [`encode`](crate::encode::encode).
    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn unknown(&self) -> i64 {
        self.unknown
    }

    /// Number of mapped words (reserved indices excluded).
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

//! Text → fixed-length index sequence.
//!
//! The classifier was trained on sequences of exactly [`SEQUENCE_LEN`] word
//! indices. Encoding lowercases the input, splits it on whitespace runs, maps
//! every token through the [`Vocabulary`], then truncates or right-pads with
//! `PAD`. No start-of-sequence marker is inserted.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::vocab::Vocabulary;

/// Number of indices fed to the model per input.
pub const SEQUENCE_LEN: usize = 20;

/// The ECMAScript whitespace and line-terminator set the vocabulary was built
/// with. Differs from Unicode `White_Space` (`\s`): includes U+FEFF, excludes
/// U+0085.
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\t\n\x0B\x0C\r \u{A0}\u{1680}\u{2000}-\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}\u{FEFF}]+",
    )
    .expect("whitespace pattern is valid")
});

/// Exactly [`SEQUENCE_LEN`] vocabulary indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodedSequence([i64; SEQUENCE_LEN]);

impl EncodedSequence {
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// The sequence as a single row of floats, the model's input dtype.
    pub fn to_f32_row(&self) -> Vec<f32> {
        self.0.iter().map(|&i| i as f32).collect()
    }
}

impl From<[i64; SEQUENCE_LEN]> for EncodedSequence {
    fn from(indices: [i64; SEQUENCE_LEN]) -> Self {
        Self(indices)
    }
}

/// Split on runs of whitespace without trimming.
///
/// Leading or trailing whitespace produces an empty first or last token, and
/// an empty string produces a single empty token. The vocabulary decides what
/// those empty tokens encode to.
pub fn tokenize(text: &str) -> Vec<&str> {
    WHITESPACE_RUN.split(text).collect()
}

/// Encode `text` into a fixed-length index sequence. Never fails.
pub fn encode(text: &str, vocab: &Vocabulary) -> EncodedSequence {
    let lower = text.to_lowercase();
    let mut indices = [vocab.pad(); SEQUENCE_LEN];
    for (slot, token) in indices.iter_mut().zip(tokenize(&lower)) {
        *slot = vocab.index_of(token);
    }
    EncodedSequence(indices)
}

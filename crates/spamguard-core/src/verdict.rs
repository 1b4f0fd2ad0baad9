//! Spam verdict: the model's probability plus the thresholded decision.

use serde::{Deserialize, Serialize};

/// Probabilities strictly above this are classified as spam. Not configurable.
pub const SPAM_THRESHOLD: f64 = 0.8;

/// Compared in `f64`: a single-precision model output of `0.8` widens to
/// slightly above the threshold and counts as spam.
pub fn is_spam(probability: f64) -> bool {
    probability > SPAM_THRESHOLD
}

/// Response payload for a classified text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub spam_probability: f64,
    pub is_spam: bool,
}

impl Verdict {
    pub fn from_probability(spam_probability: f64) -> Self {
        Self {
            spam_probability,
            is_spam: is_spam(spam_probability),
        }
    }
}

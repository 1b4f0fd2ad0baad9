//! Spam classification: encode text, run the model, apply the threshold.

use std::sync::Arc;

use spamguard_core::{EncodedSequence, Verdict, Vocabulary, encode};
use tracing::debug;

use crate::backend::ModelError;
use crate::model::LazyModel;

/// Encoder and model wired together. Cheap to clone.
#[derive(Clone)]
pub struct SpamClassifier {
    vocab: Arc<Vocabulary>,
    model: Arc<LazyModel>,
}

impl SpamClassifier {
    pub fn new(vocab: Arc<Vocabulary>, model: Arc<LazyModel>) -> Self {
        Self { vocab, model }
    }

    pub fn encode(&self, text: &str) -> EncodedSequence {
        encode(text, &self.vocab)
    }

    /// Classify a single text. Fails only if the model cannot be loaded or run.
    pub async fn classify(&self, text: &str) -> Result<Verdict, ModelError> {
        let sequence = self.encode(text);
        let probability = self.model.predict(&sequence).await?;
        let verdict = Verdict::from_probability(probability);
        debug!(
            chars = text.len(),
            probability = verdict.spam_probability,
            is_spam = verdict.is_spam,
            "classified text"
        );
        Ok(verdict)
    }

    pub fn model(&self) -> &LazyModel {
        &self.model
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }
}

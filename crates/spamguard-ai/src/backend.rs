use async_trait::async_trait;
use spamguard_core::EncodedSequence;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model load failed: {0}")]
    Load(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(any(feature = "onnx", feature = "remote"))]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A loaded spam model.
///
/// Implementations feed the sequence to the model as a single-row,
/// [`SEQUENCE_LEN`](spamguard_core::SEQUENCE_LEN)-column float matrix and
/// return the first scalar of the output as the spam probability.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Short backend identifier for logs.
    fn name(&self) -> &'static str;

    async fn predict(&self, input: &EncodedSequence) -> Result<f64, ModelError>;
}

/// Reject outputs that cannot be reported as a probability.
#[cfg_attr(not(any(feature = "onnx", feature = "remote")), allow(dead_code))]
pub(crate) fn finite_probability(value: f64) -> Result<f64, ModelError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::MalformedOutput(format!(
            "non-finite probability {value}"
        )))
    }
}

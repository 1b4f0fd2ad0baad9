//! Remote backend for a model hosted behind a TensorFlow Serving style REST
//! predict endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use spamguard_core::EncodedSequence;
use tracing::debug;

use crate::backend::{InferenceBackend, ModelError, finite_probability};

/// HTTP client for `POST <url>` with `{"instances": [[...]]}`.
pub struct RemoteBackend {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<Value>,
}

impl RemoteBackend {
    /// Create a backend for the given predict URL, e.g.
    /// `http://localhost:8501/v1/models/spam:predict`.
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl InferenceBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn predict(&self, input: &EncodedSequence) -> Result<f64, ModelError> {
        let body = PredictRequest {
            instances: vec![input.to_f32_row()],
        };

        debug!(url = %self.url, "remote predict");
        let resp = self.client.post(&self.url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ModelError::Inference(format!(
                "server returned {status}: {body}"
            )));
        }

        let parsed: PredictResponse = resp
            .json()
            .await
            .map_err(|e| ModelError::MalformedOutput(e.to_string()))?;
        first_prediction(&parsed)
    }
}

fn first_prediction(resp: &PredictResponse) -> Result<f64, ModelError> {
    let value = resp
        .predictions
        .first()
        .and_then(first_scalar)
        .ok_or_else(|| ModelError::MalformedOutput("no scalar in predictions".into()))?;
    finite_probability(value)
}

/// Descend into nested arrays until the first number.
fn first_scalar(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Array(items) => items.first().and_then(first_scalar),
        _ => None,
    }
}

//! ONNX Runtime backend for the exported spam classifier.
//!
//! The model takes one float input of shape `[1, 20]` and produces a single
//! sigmoid output. The input name is read from the session at load time so
//! exported graphs with different naming work unchanged.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use spamguard_core::{EncodedSequence, SEQUENCE_LEN};
use tracing::info;

use crate::backend::{InferenceBackend, ModelError, finite_probability};

/// Local ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so the session sits behind a mutex
/// and each prediction runs on the blocking pool.
pub struct OnnxBackend {
    session: Arc<Mutex<Session>>,
    input_name: String,
}

impl OnnxBackend {
    /// Load a model from an `.onnx` file.
    pub fn load(model_path: &Path) -> Result<Self, ModelError> {
        if !model_path.exists() {
            return Err(ModelError::Load(format!(
                "model file not found: {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| ModelError::Load(format!("session builder: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| ModelError::Load(format!("load {}: {e}", model_path.display())))?;

        let backend = Self::from_session(session)?;
        info!(
            model = %model_path.display(),
            input = %backend.input_name,
            "loaded onnx model"
        );
        Ok(backend)
    }

    /// Load a model from in-memory `.onnx` bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        let session = Session::builder()
            .map_err(|e| ModelError::Load(format!("session builder: {e}")))?
            .commit_from_memory(bytes)
            .map_err(|e| ModelError::Load(format!("load from memory: {e}")))?;
        Self::from_session(session)
    }

    /// Download an `.onnx` file over HTTP and load it.
    pub async fn fetch(url: &str) -> Result<Self, ModelError> {
        info!(url, "downloading onnx model");
        let resp = reqwest::get(url).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ModelError::Load(format!("GET {url} returned {status}")));
        }
        let bytes = resp.bytes().await?;

        let backend = tokio::task::spawn_blocking(move || Self::from_bytes(&bytes))
            .await
            .map_err(|e| ModelError::Load(format!("load task: {e}")))??;
        info!(url, input = %backend.input_name, "loaded onnx model");
        Ok(backend)
    }

    fn from_session(session: Session) -> Result<Self, ModelError> {
        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| ModelError::Load("model declares no inputs".into()))?;
        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
        })
    }
}

#[async_trait]
impl InferenceBackend for OnnxBackend {
    fn name(&self) -> &'static str {
        "onnx"
    }

    async fn predict(&self, input: &EncodedSequence) -> Result<f64, ModelError> {
        let session = Arc::clone(&self.session);
        let input_name = self.input_name.clone();
        let row = input.to_f32_row();

        tokio::task::spawn_blocking(move || run_session(&session, &input_name, row))
            .await
            .map_err(|e| ModelError::Inference(format!("inference task: {e}")))?
    }
}

fn run_session(
    session: &Mutex<Session>,
    input_name: &str,
    row: Vec<f32>,
) -> Result<f64, ModelError> {
    let shape = [1i64, SEQUENCE_LEN as i64];
    let tensor = Tensor::from_array((shape, row.into_boxed_slice()))
        .map_err(|e| ModelError::Inference(format!("build input tensor: {e}")))?;

    let mut session = session
        .lock()
        .map_err(|_| ModelError::Inference("session mutex poisoned".into()))?;
    let outputs = session
        .run(ort::inputs![input_name => tensor])
        .map_err(|e| ModelError::Inference(e.to_string()))?;

    let (_, data) = outputs[0]
        .try_extract_tensor::<f32>()
        .map_err(|e| ModelError::MalformedOutput(e.to_string()))?;
    let probability = data
        .first()
        .copied()
        .ok_or_else(|| ModelError::MalformedOutput("empty output tensor".into()))?;
    finite_probability(f64::from(probability))
}

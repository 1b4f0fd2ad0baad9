//! Lazily loaded, process-wide model handle.
//!
//! [`LazyModel`] moves through Unloaded → Loading → Loaded. Concurrent first
//! callers wait on a single load; a failed load leaves the handle Unloaded so
//! the next call tries again.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use spamguard_core::EncodedSequence;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::backend::{InferenceBackend, ModelError};

/// Where the model artifact lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Path(PathBuf),
    Url(String),
}

impl ModelSource {
    /// `http://` and `https://` locations are URLs, anything else is a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::Path(PathBuf::from(location))
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u),
        }
    }
}

/// Which [`InferenceBackend`] serves the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Local ONNX Runtime session (file path or downloaded URL).
    #[default]
    Onnx,
    /// Remote REST predict endpoint.
    Remote,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Onnx => "onnx",
            Self::Remote => "remote",
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "onnx" => Ok(Self::Onnx),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown backend '{other}' (expected onnx or remote)")),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces a ready backend. Called at most once per successful load.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn InferenceBackend>, ModelError>;

    /// Human-readable description of what is being loaded.
    fn describe(&self) -> String;
}

/// Loads a backend of the configured kind from a [`ModelSource`].
pub struct SourceLoader {
    source: ModelSource,
    kind: BackendKind,
}

impl SourceLoader {
    pub fn new(source: ModelSource, kind: BackendKind) -> Self {
        Self { source, kind }
    }
}

#[async_trait]
impl ModelLoader for SourceLoader {
    async fn load(&self) -> Result<Arc<dyn InferenceBackend>, ModelError> {
        match self.kind {
            BackendKind::Onnx => load_onnx(&self.source).await,
            BackendKind::Remote => load_remote(&self.source),
        }
    }

    fn describe(&self) -> String {
        format!("{} model at {}", self.kind, self.source)
    }
}

#[cfg(feature = "onnx")]
async fn load_onnx(source: &ModelSource) -> Result<Arc<dyn InferenceBackend>, ModelError> {
    use crate::onnx::OnnxBackend;

    let backend = match source {
        ModelSource::Url(url) => OnnxBackend::fetch(url).await?,
        ModelSource::Path(path) => {
            let path = path.clone();
            tokio::task::spawn_blocking(move || OnnxBackend::load(&path))
                .await
                .map_err(|e| ModelError::Load(format!("load task: {e}")))??
        }
    };
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "onnx"))]
async fn load_onnx(_source: &ModelSource) -> Result<Arc<dyn InferenceBackend>, ModelError> {
    Err(ModelError::Load("built without the `onnx` feature".into()))
}

#[cfg(feature = "remote")]
fn load_remote(source: &ModelSource) -> Result<Arc<dyn InferenceBackend>, ModelError> {
    match source {
        ModelSource::Url(url) => Ok(Arc::new(crate::remote::RemoteBackend::new(url.clone()))),
        ModelSource::Path(path) => Err(ModelError::Load(format!(
            "remote backend needs an http(s) URL, got {}",
            path.display()
        ))),
    }
}

#[cfg(not(feature = "remote"))]
fn load_remote(_source: &ModelSource) -> Result<Arc<dyn InferenceBackend>, ModelError> {
    Err(ModelError::Load("built without the `remote` feature".into()))
}

/// Hands out an already constructed backend.
pub struct StaticLoader(pub Arc<dyn InferenceBackend>);

#[async_trait]
impl ModelLoader for StaticLoader {
    async fn load(&self) -> Result<Arc<dyn InferenceBackend>, ModelError> {
        Ok(Arc::clone(&self.0))
    }

    fn describe(&self) -> String {
        format!("static {} backend", self.0.name())
    }
}

/// Model handle shared by every request.
pub struct LazyModel {
    loader: Box<dyn ModelLoader>,
    cell: OnceCell<Arc<dyn InferenceBackend>>,
}

impl LazyModel {
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            cell: OnceCell::new(),
        }
    }

    /// The loaded backend, loading it first if needed.
    pub async fn get(&self) -> Result<Arc<dyn InferenceBackend>, ModelError> {
        self.cell
            .get_or_try_init(|| async {
                let what = self.loader.describe();
                match self.loader.load().await {
                    Ok(backend) => {
                        info!(model = %what, backend = backend.name(), "model loaded");
                        Ok(backend)
                    }
                    Err(e) => {
                        warn!(model = %what, error = %e, "model load failed");
                        Err(e)
                    }
                }
            })
            .await
            .cloned()
    }

    /// Load eagerly, e.g. at service startup.
    pub async fn preload(&self) -> Result<(), ModelError> {
        self.get().await.map(|_| ())
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn predict(&self, input: &EncodedSequence) -> Result<f64, ModelError> {
        let backend = self.get().await?;
        backend.predict(input).await
    }
}

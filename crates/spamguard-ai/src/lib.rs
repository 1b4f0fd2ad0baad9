//! Inference layer: a lazily loaded spam model behind a pluggable backend.

mod backend;
mod classifier;
mod model;
#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "remote")]
mod remote;

pub use backend::{InferenceBackend, ModelError};
pub use classifier::SpamClassifier;
pub use model::{BackendKind, LazyModel, ModelLoader, ModelSource, SourceLoader, StaticLoader};
#[cfg(feature = "onnx")]
pub use onnx::OnnxBackend;
#[cfg(feature = "remote")]
pub use remote::RemoteBackend;

//! Service configuration, assembled by the CLI from flags and environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use spamguard_ai::{BackendKind, ModelSource};
use thiserror::Error;

/// Environment variable holding the model location (URL or path).
pub const MODEL_ENV: &str = "SPAM_MODEL_URL";

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("model location is empty (set {MODEL_ENV})")]
    EmptyModelLocation,

    #[error("vocabulary file not found: {0}")]
    VocabNotFound(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub model: ModelSource,
    pub backend: BackendKind,
    pub vocab_path: PathBuf,
    /// Load the model before accepting requests instead of on first use.
    pub preload: bool,
    /// Attach permissive CORS headers to every response.
    pub cors: bool,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.model {
            ModelSource::Path(p) if p.as_os_str().is_empty() => {
                return Err(ConfigError::EmptyModelLocation);
            }
            ModelSource::Url(u) if u.is_empty() => return Err(ConfigError::EmptyModelLocation),
            _ => {}
        }
        if !self.vocab_path.is_file() {
            return Err(ConfigError::VocabNotFound(self.vocab_path.clone()));
        }
        Ok(())
    }
}

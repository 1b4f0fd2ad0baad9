use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use spamguard_ai::BackendKind;
use spamguard_server::DEFAULT_BIND;

#[derive(Parser)]
#[command(name = "spamguard", version, about = "Spam classification service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve POST /api/spam over HTTP
    Serve(ServeArgs),
    /// Classify text given as arguments, or one line at a time from stdin
    Classify(ClassifyArgs),
    /// Print the fixed-length index sequence the model would receive
    Encode(EncodeArgs),
}

#[derive(Args)]
pub struct VocabArgs {
    /// Vocabulary JSON ({"pad", "start", "unknown", "lookup"})
    #[arg(long = "vocab", env = "SPAM_VOCAB_PATH")]
    pub path: PathBuf,
}

#[derive(Args)]
pub struct ModelArgs {
    /// Model location: .onnx path, .onnx URL, or remote predict URL
    #[arg(long = "model", env = "SPAM_MODEL_URL")]
    pub location: String,

    /// Inference backend: onnx or remote
    #[arg(long, env = "SPAM_BACKEND", default_value = "onnx")]
    pub backend: BackendKind,
}

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub vocab: VocabArgs,

    /// Address to listen on
    #[arg(long, env = "SPAM_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Load the model at startup instead of on the first request
    #[arg(long, env = "SPAM_PRELOAD")]
    pub preload: bool,

    /// Omit permissive CORS headers
    #[arg(long, env = "SPAM_NO_CORS")]
    pub no_cors: bool,
}

#[derive(Args)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub vocab: VocabArgs,

    /// Text to classify; reads stdin when omitted
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub vocab: VocabArgs,

    /// Text to encode
    pub text: String,
}

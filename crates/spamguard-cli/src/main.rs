mod classify;
mod cli;

use clap::Parser;
use spamguard_ai::ModelSource;
use spamguard_server::ServerConfig;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("spamguard v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => {
            let config = ServerConfig {
                bind: args.bind,
                model: ModelSource::parse(&args.model.location),
                backend: args.model.backend,
                vocab_path: args.vocab.path,
                preload: args.preload,
                cors: !args.no_cors,
            };
            spamguard_server::serve(config).await
        }
        Command::Classify(args) => classify::run_classify(args).await,
        Command::Encode(args) => classify::run_encode(args),
    }
}

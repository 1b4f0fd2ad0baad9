//! One-shot classification and encoding from the command line.

use std::sync::Arc;

use anyhow::Context;
use spamguard_ai::{LazyModel, ModelSource, SourceLoader, SpamClassifier};
use spamguard_core::{Vocabulary, encode};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::{ClassifyArgs, EncodeArgs};

/// Classify the argument text, or every non-empty stdin line, printing one
/// JSON verdict per input.
pub async fn run_classify(args: ClassifyArgs) -> anyhow::Result<()> {
    let vocab = Vocabulary::load(&args.vocab.path).context("loading vocabulary")?;
    let loader = SourceLoader::new(ModelSource::parse(&args.model.location), args.model.backend);
    let classifier = SpamClassifier::new(Arc::new(vocab), Arc::new(LazyModel::new(loader)));

    if !args.text.is_empty() {
        let text = args.text.join(" ");
        return print_verdict(&classifier, &text).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.is_empty() {
            continue;
        }
        print_verdict(&classifier, &line).await?;
    }
    Ok(())
}

async fn print_verdict(classifier: &SpamClassifier, text: &str) -> anyhow::Result<()> {
    let verdict = classifier.classify(text).await.context("classifying text")?;
    println!("{}", serde_json::to_string(&verdict)?);
    Ok(())
}

pub fn run_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let vocab = Vocabulary::load(&args.vocab.path).context("loading vocabulary")?;
    let sequence = encode(&args.text, &vocab);
    println!("{}", serde_json::to_string(&sequence)?);
    Ok(())
}

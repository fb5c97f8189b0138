use std::io::Write;
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use outport_indexer::config::Config;
use outport_indexer::errors::ErrorKind;
use outport_indexer::outport_models::OutportBlock;
use outport_indexer::BlockIndexer;

const TARGET: &str = "outport_indexer";

/// Reads outport blocks from the JSON files given as arguments and prints their documents,
/// one JSON object per line.
#[tokio::main]
async fn main() -> outport_indexer::Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .init();

    let indexer = Arc::new(BlockIndexer::new(config)?);
    for path in std::env::args().skip(1) {
        let raw = tokio::fs::read(&path).await?;
        let block: OutportBlock = serde_json::from_slice(&raw)?;

        let block_indexer = Arc::clone(&indexer);
        let output = tokio::task::spawn_blocking(move || block_indexer.process_block(&block))
            .await
            .map_err(|err| ErrorKind::InternalError(err.to_string()))??;
        tracing::info!(
            target: TARGET,
            path = %path,
            documents = output.documents.len(),
            "indexed block"
        );

        let mut stdout = std::io::stdout().lock();
        for document in &output.documents {
            serde_json::to_writer(&mut stdout, document)?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}

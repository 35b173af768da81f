use std::sync::Arc;
use futures_util::future::join_all;
use tracing::{info, warn, error};
use tracing_subscriber::EnvFilter;

use crpt_client::config::{ClientConfig, LogFormat};
use crpt_client::document::SampleDocuments;
use crpt_client::{AppError, DocumentClient};

fn init_logging(config: &ClientConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load Config
    let config = ClientConfig::load()?;
    init_logging(&config);

    info!("Starting document submission client...");
    info!(
        "Throttle: {} requests per {:?}, batch of {} documents",
        config.request_limit, config.window(), config.batch_size
    );

    let client = Arc::new(DocumentClient::new(&config)?);
    let batch = SampleDocuments::default().batch(config.batch_size);

    let submitter = {
        let client = client.clone();
        tokio::spawn(async move {
            let mut handles = Vec::with_capacity(batch.len());
            for (document, label) in batch {
                match client.create_document(&document, &label).await {
                    Ok(handle) => handles.push(handle),
                    Err(AppError::Cancelled) => {
                        warn!("Submission interrupted after {} requests", handles.len());
                        break;
                    }
                    Err(e) => error!("[{}] Document skipped: {}", label, e),
                }
            }
            join_all(handles.into_iter().map(|handle| handle.outcome())).await
        })
    };
    tokio::pin!(submitter);

    let outcomes = tokio::select! {
        outcomes = &mut submitter => outcomes?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
            client.shutdown();
            // In-flight requests still resolve.
            submitter.await?
        }
    };

    let accepted = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Ok(result) if result.is_accepted()))
        .count();
    info!("Batch finished: {}/{} documents accepted", accepted, outcomes.len());
    client.stats().log_stats();

    Ok(())
}

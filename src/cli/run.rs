use crate::core::settings::Settings;
use crate::sampler::{RouteSampler, WindowOutcome};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::sync::watch;

/// Runs the collection loop: one window per iteration, one sample per
/// window, until Ctrl-C (or after the first window with `--once`).
pub async fn run(config: Option<PathBuf>, once: bool) -> Result<()> {
    let settings = Settings::load(config.as_deref())?;
    settings.validate()?;

    let store_path = settings.store_path()?;
    let mut sampler = RouteSampler::new(
        &store_path,
        settings.base_url.as_str(),
        settings.request_params(),
        settings.api_key.as_str(),
    )
    .with_context(|| format!("Failed to open sample store at {}", store_path.display()))?;

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    tracing::info!(
        base_url = %settings.base_url,
        interval_secs = settings.interval_secs,
        store_json = settings.store_json,
        store_path = %store_path.display(),
        "Starting collection loop"
    );

    loop {
        let outcome = sampler
            .run_collection_window(settings.interval(), settings.store_json, &mut shutdown_rx)
            .await
            .context("Collection window failed")?;

        match outcome {
            WindowOutcome::Cancelled => {
                tracing::info!(samples = sampler.store().len(), "Collection loop stopped");
                return Ok(());
            }
            WindowOutcome::Sampled if once => {
                tracing::info!(samples = sampler.store().len(), "Single window complete");
                return Ok(());
            }
            WindowOutcome::Sampled => {}
        }
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use worker::WorkerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("worker=debug,reqwest=info")),
        )
        .init();

    let config = WorkerConfig::parse();

    // un error aquí deja la tarea InProgress; el coordinator la reasigna
    let summary = worker::run(&config)
        .await
        .context("el worker terminó con error")?;

    info!(
        "worker terminado: {} map, {} reduce, {} reportes descartados",
        summary.map_tasks, summary.reduce_tasks, summary.discarded
    );
    Ok(())
}

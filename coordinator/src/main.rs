use anyhow::{Context, Result};
use clap::Parser;
use coordinator::{failover, handlers, Coordinator, CoordinatorConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coordinator=debug,tower_http=info")),
        )
        .init();

    let config = CoordinatorConfig::parse();

    let splits = config
        .resolve_splits()
        .context("no se pudieron resolver los archivos de entrada")?;
    if splits.is_empty() {
        warn!("ningún archivo coincide con {:?}, el job sólo tendrá reduces vacíos", config.inputs);
    }

    let coordinator = Coordinator::new(splits, config.n_reduce)?;

    // router HTTP
    let app = handlers::build_router(coordinator.clone());

    // sweep de tareas vencidas en segundo plano
    tokio::spawn(failover::run_failover_loop(
        coordinator.clone(),
        config.sweep_interval(),
        config.task_timeout(),
    ));

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", config.bind))?;
    info!(
        "coordinator escuchando en {} (timeout={:?}, sweep={:?})",
        listener.local_addr()?,
        config.task_timeout(),
        config.sweep_interval()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(failover::wait_until_done(
            coordinator.clone(),
            failover::DONE_POLL_INTERVAL,
            config.exit_grace(),
        ))
        .await
        .context("el servidor RPC terminó con error")?;

    let status = coordinator.status();
    info!(
        "fin: fase {:?}, {} reasignaciones, {} workers, salidas {:?}",
        status.phase, status.redispatches, status.workers_seen, status.outputs
    );
    Ok(())
}

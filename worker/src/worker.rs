use std::{fs, path::PathBuf, process, sync::Arc, time::Duration};

use common::{apps, engine, Assignment, EngineError, MapReduceApp, Task, TaskKind, WorkerId};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::client::CoordinatorClient;
use crate::config::WorkerConfig;
use crate::error::WorkerError;

/// Espera entre Wait sucesivos: se duplica hasta `max` y vuelve al valor
/// inicial en cuanto llega trabajo.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    pub map_tasks: usize,
    pub reduce_tasks: usize,
    /// reportes que el coordinator descartó (otra ejecución ganó)
    pub discarded: usize,
}

impl WorkerSummary {
    fn record(&mut self, kind: TaskKind, accepted: bool) {
        match kind {
            TaskKind::Map => self.map_tasks += 1,
            TaskKind::Reduce => self.reduce_tasks += 1,
        }
        if !accepted {
            self.discarded += 1;
        }
    }
}

/// `<hostname>-<pid>-<uuid corto>`. Sólo identifica al que pregunta en los
/// logs del coordinator, no se guarda nada entre tareas.
pub fn worker_identity() -> WorkerId {
    let hostname = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let suffix = uuid::Uuid::new_v4().simple().to_string();

    format!("{}-{}-{}", hostname, process::id(), &suffix[..8])
}

/// Loop principal del worker.
/// - Pide tarea al coordinator.
/// - Wait: duerme con backoff y vuelve a pedir.
/// - Map/Reduce: la ejecuta, publica artefactos y reporta.
/// - Exit: termina.
///
/// Cualquier error de E/S o de RPC corta el loop.
pub async fn run(config: &WorkerConfig) -> Result<WorkerSummary, WorkerError> {
    let app = apps::by_name(&config.app)?;

    fs::create_dir_all(&config.work_dir).map_err(|e| EngineError::io(&config.work_dir, e))?;

    let client = CoordinatorClient::new(&config.coordinator_url);
    let worker_id = worker_identity();

    info!(
        "worker {} arrancando (app={}, coordinator={}, work_dir={})",
        worker_id,
        app.name(),
        client.base_url(),
        config.work_dir.display()
    );

    let mut backoff = Backoff::new(config.poll_interval(), config.max_poll_interval());
    let mut summary = WorkerSummary::default();

    loop {
        match client.request_task(&worker_id).await? {
            Assignment::Assigned { task } => {
                backoff.reset();
                let kind = task.kind();
                let id = task.id;
                info!("tengo tarea {:?} {}", kind, id);

                let done = execute_blocking(app.clone(), task, config.work_dir.clone()).await?;
                let accepted = client.report_completion(&done).await?;

                if accepted {
                    info!("tarea {:?} {} reportada", kind, id);
                } else {
                    info!("el coordinator descartó el reporte de la tarea {:?} {}", kind, id);
                }
                summary.record(kind, accepted);
            }
            Assignment::Wait => {
                let delay = backoff.next_delay();
                debug!("no hay tareas, esperando {:?}", delay);
                sleep(delay).await;
            }
            Assignment::Exit => {
                info!("job terminado, worker {} sale", worker_id);
                return Ok(summary);
            }
        }
    }
}

/// Las funciones de usuario son CPU y E/S bloqueante: van a un hilo aparte.
async fn execute_blocking(
    app: Arc<dyn MapReduceApp>,
    task: Task,
    work_dir: PathBuf,
) -> Result<Task, WorkerError> {
    let done =
        tokio::task::spawn_blocking(move || engine::execute(&*app, task, &work_dir))
            .await??;
    Ok(done)
}

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::state::Coordinator;

/// Cada cuánto se pregunta si el job terminó antes de empezar a cerrar.
pub const DONE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Loop principal de tolerancia a fallos:
/// - cada `interval` busca tareas InProgress con más de `timeout`
/// - las devuelve a la cola como Idle
///
/// No hay heartbeats: un worker caído y uno lento se ven igual, así que la
/// única recuperación posible es reasignar. Termina cuando el job termina.
pub async fn run_failover_loop(coordinator: Coordinator, interval: Duration, timeout: Duration) {
    loop {
        sleep(interval).await;

        if coordinator.is_done() {
            debug!("job terminado, se detiene el sweep");
            return;
        }

        let requeued = coordinator.sweep_stale(timeout);
        if !requeued.is_empty() {
            info!(
                "sweep: {} tareas reencoladas por timeout ({:?})",
                requeued.len(),
                requeued
            );
        }
    }
}

/// Espera a que el job termine y deja `grace` extra para que los workers
/// que siguen preguntando reciban Exit antes de cerrar el listener.
/// Ctrl-C corta la espera.
pub async fn wait_until_done(coordinator: Coordinator, poll: Duration, grace: Duration) {
    let finished = async {
        while !coordinator.is_done() {
            sleep(poll).await;
        }
        info!("job terminado, cerrando en {:?}", grace);
        sleep(grace).await;
    };

    tokio::select! {
        _ = finished => {}
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl-c recibido, cerrando");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Assignment, Phase};

    #[tokio::test]
    async fn failover_loop_requeues_abandoned_task() {
        let coordinator = Coordinator::new(vec!["a.txt".to_string()], 1).unwrap();
        let Assignment::Assigned { task } = coordinator.request_task("caido") else {
            panic!("se esperaba una tarea");
        };

        let handle = tokio::spawn(run_failover_loop(
            coordinator.clone(),
            Duration::from_millis(10),
            Duration::from_millis(30),
        ));

        let mut retried = None;
        for _ in 0..100 {
            if let Assignment::Assigned { task } = coordinator.request_task("nuevo") {
                retried = Some(task);
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert_eq!(retried.map(|t| t.id), Some(task.id));
        assert_eq!(coordinator.status().redispatches, 1);
    }

    #[tokio::test]
    async fn failover_loop_stops_when_job_is_done() {
        let coordinator = Coordinator::new(vec![], 1).unwrap();
        let Assignment::Assigned { task } = coordinator.request_task("w") else {
            panic!("se esperaba la tarea reduce");
        };
        coordinator.report_completion(task.completed_with(vec!["reduce-out-0".to_string()]));
        assert_eq!(coordinator.phase(), Phase::Exit);

        tokio::time::timeout(
            Duration::from_secs(1),
            run_failover_loop(coordinator, Duration::from_millis(5), Duration::from_secs(10)),
        )
        .await
        .expect("el sweep debería terminar solo");
    }

    #[tokio::test]
    async fn wait_until_done_returns_after_grace() {
        let coordinator = Coordinator::new(vec![], 1).unwrap();
        let Assignment::Assigned { task } = coordinator.request_task("w") else {
            panic!("se esperaba la tarea reduce");
        };
        coordinator.report_completion(task.completed_with(vec!["reduce-out-0".to_string()]));

        tokio::time::timeout(
            Duration::from_secs(1),
            wait_until_done(coordinator, Duration::from_millis(5), Duration::from_millis(5)),
        )
        .await
        .expect("debería volver en cuanto el job termina");
    }
}

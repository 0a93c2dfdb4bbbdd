// coordinator/src/state.rs

use chrono::{DateTime, Utc};
use common::{Assignment, ConfigError, JobStatus, Phase, Task, TaskId, TaskKind, WorkerId};
use std::{
    collections::{HashSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Idle,
    InProgress,
    Completed,
}

/// Estado de una tarea de la fase actual.
/// Idle -> InProgress -> Completed, y InProgress -> Idle sólo por timeout.
#[derive(Debug, Clone)]
pub(crate) struct TaskRecord {
    pub task: Task,
    pub status: TaskStatus,
    pub started_at: Option<Instant>,
    // sólo para logs: a quién se le dio la última vez
    pub worker_id: Option<WorkerId>,
}

impl TaskRecord {
    fn idle(task: Task) -> Self {
        Self {
            task,
            status: TaskStatus::Idle,
            started_at: None,
            worker_id: None,
        }
    }
}

/// Todo el estado del job detrás de un único lock: cola, registros, fase y
/// tabla de particiones. Los handlers HTTP y el sweep compiten por él.
#[derive(Debug)]
struct JobState {
    phase: Phase,
    partition_count: usize,
    map_tasks: usize,

    // registros de la fase actual, índice = id de tarea
    records: Vec<TaskRecord>,
    // tareas pendientes de asignar
    queue: VecDeque<TaskId>,

    // partición -> artefactos map destinados a ella
    partitions: Vec<Vec<String>>,
    // partición -> salida reduce publicada
    outputs: Vec<Option<String>>,

    redispatches: u64,
    workers_seen: HashSet<WorkerId>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct Coordinator {
    state: Arc<Mutex<JobState>>,
}

impl Coordinator {
    /// Crea el job: una tarea Map por split, todas en cola.
    pub fn new(splits: Vec<String>, partition_count: usize) -> Result<Self, ConfigError> {
        if partition_count == 0 {
            return Err(ConfigError::ZeroPartitions);
        }

        let records: Vec<TaskRecord> = splits
            .into_iter()
            .enumerate()
            .map(|(id, split)| TaskRecord::idle(Task::map(id, split, partition_count)))
            .collect();

        let mut state = JobState {
            phase: Phase::Map,
            partition_count,
            map_tasks: records.len(),
            queue: (0..records.len()).collect(),
            records,
            partitions: vec![Vec::new(); partition_count],
            outputs: vec![None; partition_count],
            redispatches: 0,
            workers_seen: HashSet::new(),
            started_at: Utc::now(),
            finished_at: None,
        };

        info!(
            "job creado: {} tareas map, {} particiones reduce",
            state.map_tasks, partition_count
        );

        // sin splits la fase map ya está completa
        state.advance_if_phase_complete();

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, JobState> {
        // ninguna operación hace panic a mitad de un cambio
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn request_task(&self, worker_id: &str) -> Assignment {
        self.request_task_at(worker_id, Instant::now())
    }

    pub fn request_task_at(&self, worker_id: &str, now: Instant) -> Assignment {
        self.lock().dispatch(worker_id, now)
    }

    /// Devuelve true si el reporte se aceptó. Un reporte obsoleto o
    /// duplicado se descarta sin error.
    pub fn report_completion(&self, task: Task) -> bool {
        self.lock().complete(task)
    }

    /// Reencola las tareas InProgress que llevan más de `timeout`.
    pub fn sweep_stale(&self, timeout: Duration) -> Vec<TaskId> {
        self.sweep_stale_at(Instant::now(), timeout)
    }

    pub fn sweep_stale_at(&self, now: Instant, timeout: Duration) -> Vec<TaskId> {
        self.lock().requeue_stale(now, timeout)
    }

    pub fn is_done(&self) -> bool {
        self.lock().phase == Phase::Exit
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn status(&self) -> JobStatus {
        let state = self.lock();
        let count = |status: TaskStatus| {
            state
                .records
                .iter()
                .filter(|r| r.status == status)
                .count()
        };

        JobStatus {
            phase: state.phase,
            partition_count: state.partition_count,
            map_tasks: state.map_tasks,
            idle: count(TaskStatus::Idle),
            in_progress: count(TaskStatus::InProgress),
            completed: count(TaskStatus::Completed),
            redispatches: state.redispatches,
            workers_seen: state.workers_seen.len(),
            started_at: state.started_at,
            finished_at: state.finished_at,
            outputs: state.outputs.iter().flatten().cloned().collect(),
        }
    }
}

impl JobState {
    fn dispatch(&mut self, worker_id: &str, now: Instant) -> Assignment {
        if self.phase == Phase::Exit {
            return Assignment::Exit;
        }

        if !self.workers_seen.contains(worker_id) {
            self.workers_seen.insert(worker_id.to_string());
        }

        while let Some(id) = self.queue.pop_front() {
            let record = &mut self.records[id];

            if record.status != TaskStatus::Idle {
                // completada por un reporte tardío mientras esperaba en cola
                debug!("tarea {} ya no está Idle, se saca de la cola", id);
                continue;
            }

            record.status = TaskStatus::InProgress;
            record.started_at = Some(now);
            record.worker_id = Some(worker_id.to_string());

            info!(
                "asignando tarea {:?} {} al worker {}",
                record.task.kind(),
                id,
                worker_id
            );
            return Assignment::Assigned {
                task: record.task.clone(),
            };
        }

        debug!("worker {} pidió tarea pero no hay tareas en cola", worker_id);
        Assignment::Wait
    }

    fn complete(&mut self, task: Task) -> bool {
        let kind = task.kind();

        if self.phase.task_kind() != Some(kind) {
            warn!(
                "descartando reporte de tarea {:?} {} en fase {:?}",
                kind, task.id, self.phase
            );
            return false;
        }

        let expected_outputs = match kind {
            TaskKind::Map => self.partition_count,
            TaskKind::Reduce => 1,
        };

        let Some(record) = self.records.get_mut(task.id) else {
            warn!("descartando reporte de tarea {:?} {} inexistente", kind, task.id);
            return false;
        };

        if record.status == TaskStatus::Completed {
            info!(
                "reporte duplicado de tarea {:?} {}, ya estaba completada",
                kind, task.id
            );
            return false;
        }

        if task.outputs.len() != expected_outputs {
            warn!(
                "descartando reporte de tarea {:?} {}: {} salidas, se esperaban {}",
                kind,
                task.id,
                task.outputs.len(),
                expected_outputs
            );
            return false;
        }

        record.status = TaskStatus::Completed;
        record.started_at = None;
        record.worker_id = None;
        record.task.outputs = task.outputs.clone();

        match kind {
            TaskKind::Map => {
                for (p, artifact) in task.outputs.into_iter().enumerate() {
                    self.partitions[p].push(artifact);
                }
            }
            TaskKind::Reduce => {
                self.outputs[task.id] = task.outputs.into_iter().next();
            }
        }

        info!("tarea {:?} {} completada", kind, task.id);

        // en la misma sección crítica: dos últimos reportes simultáneos no
        // pueden sembrar reduce dos veces
        self.advance_if_phase_complete();
        true
    }

    fn advance_if_phase_complete(&mut self) {
        loop {
            let all_done = self
                .records
                .iter()
                .all(|r| r.status == TaskStatus::Completed);
            if !all_done {
                return;
            }

            match self.phase {
                Phase::Map => self.seed_reduce(),
                Phase::Reduce => {
                    self.phase = Phase::Exit;
                    self.queue.clear();
                    self.finished_at = Some(Utc::now());
                    info!("todas las tareas reduce completadas, job terminado");
                    return;
                }
                Phase::Exit => return,
            }
        }
    }

    fn seed_reduce(&mut self) {
        let n = self.partition_count;
        let partitions = std::mem::take(&mut self.partitions);

        self.records = partitions
            .into_iter()
            .enumerate()
            .map(|(p, intermediates)| TaskRecord::idle(Task::reduce(p, intermediates, n)))
            .collect();
        self.queue = (0..n).collect();
        self.phase = Phase::Reduce;

        info!("fase map completa, {} tareas reduce encoladas", n);
    }

    fn requeue_stale(&mut self, now: Instant, timeout: Duration) -> Vec<TaskId> {
        let mut requeued = Vec::new();

        for record in self
            .records
            .iter_mut()
            .filter(|r| r.status == TaskStatus::InProgress)
        {
            let Some(started) = record.started_at else {
                continue;
            };
            let elapsed = now.saturating_duration_since(started);
            if elapsed <= timeout {
                continue;
            }

            warn!(
                "tarea {:?} {} sin terminar tras {:?} (worker {}), reencolando",
                record.task.kind(),
                record.task.id,
                elapsed,
                record.worker_id.as_deref().unwrap_or("?")
            );

            record.status = TaskStatus::Idle;
            record.started_at = None;
            record.worker_id = None;
            requeued.push(record.task.id);
        }

        self.queue.extend(requeued.iter().copied());
        self.redispatches += requeued.len() as u64;
        requeued
    }
}

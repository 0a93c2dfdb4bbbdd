use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::TaskKind;

/// Etapa global del job. Sólo avanza: Map -> Reduce -> Exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Map,
    Reduce,
    Exit,
}

impl Phase {
    /// Tipo de tarea que se despacha en esta fase (ninguno en Exit).
    pub fn task_kind(self) -> Option<TaskKind> {
        match self {
            Phase::Map => Some(TaskKind::Map),
            Phase::Reduce => Some(TaskKind::Reduce),
            Phase::Exit => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub phase: Phase,
    pub partition_count: usize,
    pub map_tasks: usize,

    /// -------- Tareas de la fase actual --------
    pub idle: usize,
    pub in_progress: usize,
    pub completed: usize,

    /// Veces que el sweep devolvió una tarea a la cola
    pub redispatches: u64,
    pub workers_seen: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Salidas reduce ya publicadas, ordenadas por partición
    pub outputs: Vec<String>,
}

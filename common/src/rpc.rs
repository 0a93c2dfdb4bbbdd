use serde::{Deserialize, Serialize};

use crate::task::Task;

pub type WorkerId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub worker_id: WorkerId,
}

/// Respuesta a `RequestTask`. Las señales de control van como variantes
/// propias en vez de tareas "falsas".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assignment {
    Assigned { task: Task },
    /// No hay trabajo pendiente todavía, volver a preguntar más tarde
    Wait,
    /// El job terminó, el worker debe salir
    Exit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionAck {
    /// false cuando el reporte era obsoleto o duplicado y se descartó
    pub accepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoneResponse {
    pub done: bool,
}

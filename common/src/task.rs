use serde::{Deserialize, Serialize};

pub type TaskId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    Map,
    Reduce,
}

/// Entrada de una tarea. El tipo de tarea se deduce de aquí, así no puede
/// existir un Map con varias entradas ni un Reduce con un solo split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskInput {
    /// Un split de entrada del job
    Map { split: String },
    /// Todos los artefactos intermedios de una partición (uno por tarea Map)
    Reduce { intermediates: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,

    #[serde(flatten)]
    pub input: TaskInput,

    /// N: número de particiones de reduce, fijo para todo el job
    pub partition_count: usize,

    /// Artefactos publicados por el worker que completó la tarea.
    /// Map: N rutas (índice = partición). Reduce: una ruta.
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl Task {
    pub fn map(id: TaskId, split: impl Into<String>, partition_count: usize) -> Self {
        Self {
            id,
            input: TaskInput::Map {
                split: split.into(),
            },
            partition_count,
            outputs: Vec::new(),
        }
    }

    pub fn reduce(id: TaskId, intermediates: Vec<String>, partition_count: usize) -> Self {
        Self {
            id,
            input: TaskInput::Reduce { intermediates },
            partition_count,
            outputs: Vec::new(),
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self.input {
            TaskInput::Map { .. } => TaskKind::Map,
            TaskInput::Reduce { .. } => TaskKind::Reduce,
        }
    }

    /// Devuelve la tarea con sus salidas ya rellenadas.
    pub fn completed_with(mut self, outputs: Vec<String>) -> Self {
        self.outputs = outputs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_task_serializes_with_flat_kind_tag() {
        let task = Task::map(3, "pg-1.txt", 2);
        let v = serde_json::to_value(&task).unwrap();

        assert_eq!(v["kind"], "MAP");
        assert_eq!(v["split"], "pg-1.txt");
        assert_eq!(v["id"], 3);
        assert_eq!(v["partition_count"], 2);
    }

    #[test]
    fn reduce_task_without_outputs_field_deserializes() {
        let raw = r#"{"id":1,"kind":"REDUCE","intermediates":["map-0-1","map-1-1"],"partition_count":2}"#;
        let task: Task = serde_json::from_str(raw).unwrap();

        assert_eq!(task.kind(), TaskKind::Reduce);
        assert!(task.outputs.is_empty());
        assert_eq!(
            task.input,
            TaskInput::Reduce {
                intermediates: vec!["map-0-1".to_string(), "map-1-1".to_string()]
            }
        );
    }
}

use std::{io, path::PathBuf};

use thiserror::Error;

/// Fallos locales al ejecutar una tarea. Para el worker todos son fatales:
/// la tarea queda InProgress hasta que el coordinator la reasigne.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("error de E/S en {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("registro inválido en {path}:{line}: {source}")]
    Decode {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("el número de particiones de reduce debe ser mayor que 0")]
    ZeroPartitions,

    #[error("aplicación desconocida: {0} (disponibles: {1})")]
    UnknownApp(String, String),

    #[error("patrón de entrada inválido {pattern}: {reason}")]
    BadPattern { pattern: String, reason: String },
}

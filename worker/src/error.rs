use common::{ConfigError, EngineError};
use thiserror::Error;

/// Todo error es fatal para el proceso worker: no hay reintentos locales,
/// la tarea la recupera el coordinator por timeout.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("error RPC con el coordinator: {0}")]
    Rpc(#[from] reqwest::Error),

    #[error("la ejecución de la tarea terminó con pánico: {0}")]
    Join(#[from] tokio::task::JoinError),
}

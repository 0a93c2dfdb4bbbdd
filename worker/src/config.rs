use std::{path::PathBuf, time::Duration};

use clap::Parser;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_MAX_POLL_INTERVAL_MS: u64 = 4000;

#[derive(Debug, Clone, Parser)]
#[command(name = "worker")]
#[command(about = "Worker MapReduce: pide tareas al coordinator y las ejecuta")]
pub struct WorkerConfig {
    /// URL base del coordinator
    #[arg(long, env = "COORDINATOR_URL", default_value = "http://localhost:8080")]
    pub coordinator_url: String,

    /// Aplicación map/reduce a ejecutar (wordcount, indexer)
    #[arg(long, env = "MR_APP", default_value = "wordcount")]
    pub app: String,

    /// Directorio donde se publican los artefactos (compartido por los workers)
    #[arg(long, env = "MR_WORK_DIR", default_value = ".")]
    pub work_dir: PathBuf,

    /// Espera inicial cuando el coordinator responde Wait
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    /// Tope del backoff exponencial
    #[arg(long, default_value_t = DEFAULT_MAX_POLL_INTERVAL_MS)]
    pub max_poll_interval_ms: u64,
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_poll_interval(&self) -> Duration {
        Duration::from_millis(self.max_poll_interval_ms.max(self.poll_interval_ms))
    }
}

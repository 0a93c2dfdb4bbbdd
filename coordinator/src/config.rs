use std::{collections::BTreeSet, time::Duration};

use clap::Parser;
use common::ConfigError;
use glob::glob;

pub const DEFAULT_TASK_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5;
/// Tiene que cubrir el tope de backoff del worker más el intervalo con el
/// que se pregunta por Done, si no un worker dormido encuentra el puerto
/// cerrado en vez de Exit.
pub const DEFAULT_EXIT_GRACE_SECS: u64 = 6;

#[derive(Debug, Clone, Parser)]
#[command(name = "coordinator")]
#[command(about = "Coordinator MapReduce: reparte tareas map/reduce entre workers")]
pub struct CoordinatorConfig {
    /// Patrones de archivos de entrada, ej: "data/pg-*.txt". Cada archivo es un split.
    #[arg(value_name = "INPUT_GLOB", required = true)]
    pub inputs: Vec<String>,

    /// Número de particiones / tareas reduce
    #[arg(short = 'n', long, env = "N_REDUCE", default_value_t = 10)]
    pub n_reduce: usize,

    /// Dirección donde escucha el servidor RPC
    #[arg(long, env = "COORDINATOR_BIND", default_value = "0.0.0.0:8080")]
    pub bind: String,

    /// Segundos que puede tardar una tarea antes de reasignarla
    #[arg(long, env = "TASK_TIMEOUT_SECS", default_value_t = DEFAULT_TASK_TIMEOUT_SECS)]
    pub task_timeout_secs: u64,

    /// Cada cuántos segundos se buscan tareas vencidas
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value_t = DEFAULT_SWEEP_INTERVAL_SECS)]
    pub sweep_interval_secs: u64,

    /// Segundos que se sigue respondiendo Exit después de terminar
    #[arg(long, env = "EXIT_GRACE_SECS", default_value_t = DEFAULT_EXIT_GRACE_SECS)]
    pub exit_grace_secs: u64,
}

impl CoordinatorConfig {
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn exit_grace(&self) -> Duration {
        Duration::from_secs(self.exit_grace_secs)
    }

    pub fn resolve_splits(&self) -> Result<Vec<String>, ConfigError> {
        resolve_splits(&self.inputs)
    }
}

/// Expande los patrones a la lista ordenada y sin repetidos de archivos
/// regulares que hacen match.
pub fn resolve_splits(patterns: &[String]) -> Result<Vec<String>, ConfigError> {
    let mut files = BTreeSet::new();

    for pattern in patterns {
        let entries = glob(pattern).map_err(|e| ConfigError::BadPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;

        for path in entries.flatten() {
            if path.is_file() {
                files.insert(path.to_string_lossy().to_string());
            }
        }
    }

    Ok(files.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_match_documented_values() {
        let config = CoordinatorConfig::try_parse_from(["coordinator", "in/*.txt"]).unwrap();

        assert_eq!(config.n_reduce, 10);
        assert_eq!(config.task_timeout(), Duration::from_secs(10));
        assert_eq!(config.sweep_interval(), Duration::from_secs(5));
        assert_eq!(config.inputs, vec!["in/*.txt".to_string()]);
    }

    #[test]
    fn inputs_are_required() {
        assert!(CoordinatorConfig::try_parse_from(["coordinator"]).is_err());
    }

    #[test]
    fn resolve_splits_expands_sorts_and_dedups() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt", "c.md"] {
            fs::write(tmp.path().join(name), "x").unwrap();
        }
        fs::create_dir(tmp.path().join("dir.txt")).unwrap();

        let base = tmp.path().to_string_lossy().to_string();
        let patterns = vec![format!("{}/*.txt", base), format!("{}/a.*", base)];

        let splits = resolve_splits(&patterns).unwrap();

        assert_eq!(
            splits,
            vec![format!("{}/a.txt", base), format!("{}/b.txt", base)]
        );
    }

    #[test]
    fn resolve_splits_rejects_bad_pattern() {
        let err = resolve_splits(&["[".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::BadPattern { .. }));
    }
}

//! Aplicaciones MapReduce incluidas. El worker elige una por nombre al
//! arrancar; el coordinator nunca las conoce.

mod indexer;
mod wordcount;

use std::sync::Arc;

use crate::error::ConfigError;
use crate::kv::KeyValue;

pub use indexer::Indexer;
pub use wordcount::WordCount;

/// Funciones de usuario. Deben ser puras y deterministas: una tarea puede
/// ejecutarse más de una vez y ambas ejecuciones tienen que producir lo mismo.
pub trait MapReduceApp: Send + Sync {
    fn name(&self) -> &'static str;

    /// `filename` identifica el split, `contents` es el split completo.
    fn map(&self, filename: &str, contents: &str) -> Vec<KeyValue>;

    /// Se llama una vez por clave distinta con todos sus valores.
    fn reduce(&self, key: &str, values: &[String]) -> String;
}

pub const AVAILABLE: &[&str] = &["wordcount", "indexer"];

pub fn by_name(name: &str) -> Result<Arc<dyn MapReduceApp>, ConfigError> {
    match name {
        "wordcount" => Ok(Arc::new(WordCount)),
        "indexer" => Ok(Arc::new(Indexer)),
        other => Err(ConfigError::UnknownApp(
            other.to_string(),
            AVAILABLE.join(", "),
        )),
    }
}

/// Normaliza una palabra: sólo alfanuméricos y '_', en minúscula.
pub(crate) fn normalize_token(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

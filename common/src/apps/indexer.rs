use std::collections::BTreeSet;

use super::{normalize_token, MapReduceApp};
use crate::kv::KeyValue;

/// Índice invertido: para cada palabra, en cuántos documentos aparece y
/// cuáles son. Salida: `3 a.txt,b.txt,c.txt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Indexer;

impl MapReduceApp for Indexer {
    fn name(&self) -> &'static str {
        "indexer"
    }

    fn map(&self, filename: &str, contents: &str) -> Vec<KeyValue> {
        let words: BTreeSet<String> = contents
            .split_whitespace()
            .filter_map(normalize_token)
            .collect();

        words
            .into_iter()
            .map(|word| KeyValue::new(word, filename))
            .collect()
    }

    fn reduce(&self, _key: &str, values: &[String]) -> String {
        let docs: BTreeSet<&str> = values.iter().map(String::as_str).collect();
        let joined: Vec<&str> = docs.into_iter().collect();
        format!("{} {}", joined.len(), joined.join(","))
    }
}

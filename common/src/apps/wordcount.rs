use super::{normalize_token, MapReduceApp};
use crate::kv::KeyValue;

/// Cuenta palabras: map emite (palabra, "1"), reduce suma.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCount;

impl MapReduceApp for WordCount {
    fn name(&self) -> &'static str {
        "wordcount"
    }

    fn map(&self, _filename: &str, contents: &str) -> Vec<KeyValue> {
        contents
            .split_whitespace()
            .filter_map(normalize_token)
            .map(|word| KeyValue::new(word, "1"))
            .collect()
    }

    /// Los valores que no son un entero se ignoran: `map` sólo emite "1",
    /// así que sólo aparecen si alguien escribió los intermedios a mano.
    fn reduce(&self, _key: &str, values: &[String]) -> String {
        let total: u64 = values.iter().filter_map(|v| v.parse::<u64>().ok()).sum();
        total.to_string()
    }
}

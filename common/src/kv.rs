use serde::{Deserialize, Serialize};
use std::hash::Hasher;

/// Par clave/valor emitido por `map`. Es también el registro de los
/// artefactos intermedios (una línea JSON por par).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Hash estable entre procesos (FNV-1a de 64 bits), recortado a 31 bits.
pub fn ihash(key: &str) -> u32 {
    let mut h = fnv::FnvHasher::default();
    h.write(key.as_bytes());
    (h.finish() & 0x7fff_ffff) as u32
}

/// Partición de reduce a la que va una clave.
pub fn partition_for(key: &str, partition_count: usize) -> usize {
    ihash(key) as usize % partition_count
}

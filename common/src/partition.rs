//! Contrato compartido entre map y reduce: a qué bucket va cada clave
//! y cómo se llaman los archivos intermedios y de salida.
//!
//! Todo lo de este módulo tiene que ser idéntico en todos los procesos
//! worker. Si cambia, el reduce agrupa mal y nadie se entera.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::task::TaskNumber;

/// Par clave/valor que emite la función map del usuario.
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

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// FNV-1a de 32 bits sobre los bytes de la clave, enmascarado a no negativo.
pub fn ihash(key: &str) -> u32 {
    let mut h = FNV32_OFFSET_BASIS;
    for b in key.as_bytes() {
        h ^= u32::from(*b);
        h = h.wrapping_mul(FNV32_PRIME);
    }
    h & 0x7fff_ffff
}

/// Bucket (tarea reduce) al que se manda una clave.
pub fn bucket_for(key: &str, n_reduce: usize) -> usize {
    debug_assert!(n_reduce > 0, "n_reduce debe ser >= 1");
    ihash(key) as usize % n_reduce
}

/// `mr-<m>-<r>`
pub fn intermediate_file_name(map_task: TaskNumber, reduce_task: TaskNumber) -> String {
    format!("mr-{}-{}", map_task, reduce_task)
}

/// `mr-out-<r>`
pub fn output_file_name(reduce_task: TaskNumber) -> String {
    format!("mr-out-{}", reduce_task)
}

pub fn intermediate_path(dir: &Path, map_task: TaskNumber, reduce_task: TaskNumber) -> PathBuf {
    dir.join(intermediate_file_name(map_task, reduce_task))
}

pub fn output_path(dir: &Path, reduce_task: TaskNumber) -> PathBuf {
    dir.join(output_file_name(reduce_task))
}

/// Reparte los pares en `n_reduce` buckets, preservando el orden de emisión.
pub fn partition(kvs: Vec<KeyValue>, n_reduce: usize) -> Vec<Vec<KeyValue>> {
    let mut buckets: Vec<Vec<KeyValue>> = vec![Vec::new(); n_reduce];
    for kv in kvs {
        let b = bucket_for(&kv.key, n_reduce);
        buckets[b].push(kv);
    }
    buckets
}

use std::{
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::error::EngineError;
use crate::task::TaskId;

/// Prefijo de los temporales; nunca coincide con un nombre publicado.
pub const TMP_PREFIX: &str = "mr-tmp-";

pub fn map_artifact_name(map_task: TaskId, partition: usize) -> String {
    format!("map-{}-{}", map_task, partition)
}

pub fn reduce_artifact_name(partition: usize) -> String {
    format!("reduce-out-{}", partition)
}

/// Escribe un artefacto en un temporal con nombre único dentro de `dir` y
/// lo renombra a `name` sólo si todo salió bien. Dos ejecuciones de la misma
/// tarea nunca se pisan a medias: gana el último rename.
pub fn publish<F>(dir: &Path, name: &str, write: F) -> Result<PathBuf, EngineError>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let target = dir.join(name);

    let tmp = tempfile::Builder::new()
        .prefix(TMP_PREFIX)
        .tempfile_in(dir)
        .map_err(|e| EngineError::io(dir, e))?;

    {
        let mut writer = BufWriter::new(tmp.as_file());
        write(&mut writer)
            .and_then(|_| writer.flush())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| EngineError::io(tmp.path(), e))?;
    }

    // si falla, el temporal se borra al soltarse el error
    tmp.persist(&target)
        .map_err(|e| EngineError::io(&target, e.error))?;

    Ok(target)
}

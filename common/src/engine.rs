use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use crate::apps::MapReduceApp;
use crate::artifact::{map_artifact_name, publish, reduce_artifact_name};
use crate::error::EngineError;
use crate::kv::{partition_for, KeyValue};
use crate::task::{Task, TaskId, TaskInput};

/// Ejecuta la tarea y la devuelve con `outputs` rellenado, lista para
/// reportar al coordinator.
pub fn execute(app: &dyn MapReduceApp, task: Task, work_dir: &Path) -> Result<Task, EngineError> {
    let outputs = match &task.input {
        TaskInput::Map { split } => run_map(app, task.id, split, task.partition_count, work_dir)?,
        TaskInput::Reduce { intermediates } => run_reduce(app, task.id, intermediates, work_dir)?,
    };
    Ok(task.completed_with(outputs))
}

/* =========================
   Map
   ========================= */

/// 1. Lee el split entero.
/// 2. Llama a `map`.
/// 3. Reparte los pares en N buckets por hash(key) % N.
/// 4. Publica cada bucket como `map-<id>-<p>` (también los vacíos).
pub fn run_map(
    app: &dyn MapReduceApp,
    id: TaskId,
    split: &str,
    partition_count: usize,
    work_dir: &Path,
) -> Result<Vec<String>, EngineError> {
    let contents = fs::read_to_string(split).map_err(|e| EngineError::io(split, e))?;

    let buckets = partition(app.map(split, &contents), partition_count);

    buckets
        .iter()
        .enumerate()
        .map(|(p, bucket)| {
            let path = publish(work_dir, &map_artifact_name(id, p), |w| {
                write_records(w, bucket)
            })?;
            Ok(path.to_string_lossy().to_string())
        })
        .collect()
}

pub fn partition(records: Vec<KeyValue>, partition_count: usize) -> Vec<Vec<KeyValue>> {
    let mut buckets: Vec<Vec<KeyValue>> = vec![Vec::new(); partition_count];
    for kv in records {
        let p = partition_for(&kv.key, partition_count);
        buckets[p].push(kv);
    }
    buckets
}

fn write_records(w: &mut dyn Write, records: &[KeyValue]) -> io::Result<()> {
    for kv in records {
        serde_json::to_writer(&mut *w, kv)?;
        w.write_all(b"\n")?;
    }
    Ok(())
}

/// Lee un artefacto intermedio (JSONL, un par por línea).
pub fn read_intermediate(path: &Path) -> Result<Vec<KeyValue>, EngineError> {
    let file = File::open(path).map_err(|e| EngineError::io(path, e))?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| EngineError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let kv: KeyValue = serde_json::from_str(&line).map_err(|e| EngineError::Decode {
            path: path.to_path_buf(),
            line: n + 1,
            source: e,
        })?;
        out.push(kv);
    }

    Ok(out)
}

/* =========================
   Reduce
   ========================= */

/// Junta todos los artefactos de la partición, agrupa por clave, llama a
/// `reduce` una vez por clave y publica `reduce-out-<id>` con líneas
/// `clave valor` ordenadas por clave.
pub fn run_reduce(
    app: &dyn MapReduceApp,
    id: TaskId,
    intermediates: &[String],
    work_dir: &Path,
) -> Result<Vec<String>, EngineError> {
    let mut records = Vec::new();
    for path in intermediates {
        records.extend(read_intermediate(Path::new(path))?);
    }

    let reduced = reduce_sorted(app, records);

    let path = publish(work_dir, &reduce_artifact_name(id), |w| {
        for (key, value) in &reduced {
            writeln!(w, "{} {}", key, value)?;
        }
        Ok(())
    })?;

    Ok(vec![path.to_string_lossy().to_string()])
}

/// Ordena por clave (estable) y reduce cada grupo contiguo.
pub fn reduce_sorted(app: &dyn MapReduceApp, mut records: Vec<KeyValue>) -> Vec<(String, String)> {
    records.sort_by(|a, b| a.key.cmp(&b.key));

    records
        .chunk_by(|a, b| a.key == b.key)
        .map(|group| {
            let key = group[0].key.clone();
            let values: Vec<String> = group.iter().map(|kv| kv.value.clone()).collect();
            let reduced = app.reduce(&key, &values);
            (key, reduced)
        })
        .collect()
}

/* =========================
   Ejecución local (un solo proceso)
   ========================= */

/// Corre la aplicación completa sin coordinator ni particiones. Sirve de
/// referencia para comparar contra la salida distribuida.
pub fn run_sequential(
    app: &dyn MapReduceApp,
    inputs: &[PathBuf],
) -> Result<Vec<(String, String)>, EngineError> {
    let mut records = Vec::new();
    for input in inputs {
        let contents = fs::read_to_string(input).map_err(|e| EngineError::io(input, e))?;
        records.extend(app.map(&input.to_string_lossy(), &contents));
    }
    Ok(reduce_sorted(app, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::WordCount;
    use std::collections::HashSet;

    fn write_input(dir: &Path, name: &str, text: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path.to_string_lossy().to_string()
    }

    fn read_lines(path: &str) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn map_publishes_one_artifact_per_partition() {
        let tmp = tempfile::tempdir().unwrap();
        let split = write_input(tmp.path(), "in.txt", "a b c d e f a");

        let outputs = run_map(&WordCount, 4, &split, 3, tmp.path()).unwrap();

        assert_eq!(outputs.len(), 3);
        for (p, out) in outputs.iter().enumerate() {
            assert!(out.ends_with(&format!("map-4-{}", p)));
            assert!(Path::new(out).exists());
        }
    }

    #[test]
    fn map_routes_every_key_to_its_hash_partition() {
        let tmp = tempfile::tempdir().unwrap();
        let split = write_input(tmp.path(), "in.txt", "uno dos tres cuatro cinco seis uno");

        let outputs = run_map(&WordCount, 0, &split, 2, tmp.path()).unwrap();

        let mut total = 0;
        for (p, out) in outputs.iter().enumerate() {
            let kvs = read_intermediate(Path::new(out)).unwrap();
            total += kvs.len();
            for kv in kvs {
                assert_eq!(partition_for(&kv.key, 2), p);
            }
        }
        assert_eq!(total, 7);
    }

    #[test]
    fn map_with_missing_split_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("no_existe.txt");

        let res = run_map(&WordCount, 0, &missing.to_string_lossy(), 2, tmp.path());

        assert!(matches!(res, Err(EngineError::Io { .. })));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn reduce_groups_values_from_every_map_task() {
        let tmp = tempfile::tempdir().unwrap();
        let a = write_input(tmp.path(), "a.txt", "gato perro gato");
        let b = write_input(tmp.path(), "b.txt", "perro gato pez");

        let out_a = run_map(&WordCount, 0, &a, 1, tmp.path()).unwrap();
        let out_b = run_map(&WordCount, 1, &b, 1, tmp.path()).unwrap();
        let intermediates = vec![out_a[0].clone(), out_b[0].clone()];

        let outputs = run_reduce(&WordCount, 0, &intermediates, tmp.path()).unwrap();

        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].ends_with("reduce-out-0"));
        assert_eq!(read_lines(&outputs[0]), vec!["gato 3", "perro 2", "pez 1"]);
    }

    #[test]
    fn reduce_with_no_intermediates_writes_empty_output() {
        let tmp = tempfile::tempdir().unwrap();

        let outputs = run_reduce(&WordCount, 2, &[], tmp.path()).unwrap();

        assert!(read_lines(&outputs[0]).is_empty());
    }

    #[test]
    fn read_intermediate_reports_bad_line() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("map-0-0");
        fs::write(&path, "{\"key\":\"a\",\"value\":\"1\"}\nno es json\n").unwrap();

        let err = read_intermediate(&path).unwrap_err();

        assert!(matches!(err, EngineError::Decode { line: 2, .. }));
    }

    #[test]
    fn execute_fills_outputs_for_both_kinds() {
        let tmp = tempfile::tempdir().unwrap();
        let split = write_input(tmp.path(), "in.txt", "x y z");

        let map_done = execute(&WordCount, Task::map(0, split, 2), tmp.path()).unwrap();
        assert_eq!(map_done.outputs.len(), 2);

        let reduce_in = vec![map_done.outputs[1].clone()];
        let reduce_done = execute(&WordCount, Task::reduce(1, reduce_in, 2), tmp.path()).unwrap();
        assert_eq!(reduce_done.outputs.len(), 1);
        assert!(reduce_done.outputs[0].ends_with("reduce-out-1"));
    }

    #[test]
    fn partitioned_run_matches_sequential_run() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        fs::create_dir_all(&work).unwrap();
        let a = write_input(tmp.path(), "a.txt", "el sol y la luna y el mar");
        let b = write_input(tmp.path(), "b.txt", "la luna el sol");
        let n = 3;

        let maps: Vec<Vec<String>> = [&a, &b]
            .iter()
            .enumerate()
            .map(|(i, split)| run_map(&WordCount, i, split, n, &work).unwrap())
            .collect();

        let mut distributed = Vec::new();
        let mut seen_keys = HashSet::new();
        for p in 0..n {
            let row: Vec<String> = maps.iter().map(|outs| outs[p].clone()).collect();
            let out = run_reduce(&WordCount, p, &row, &work).unwrap();
            for line in read_lines(&out[0]) {
                let (k, v) = line.split_once(' ').unwrap();
                // ninguna clave aparece en dos particiones
                assert!(seen_keys.insert(k.to_string()));
                distributed.push((k.to_string(), v.to_string()));
            }
        }
        distributed.sort();

        let sequential =
            run_sequential(&WordCount, &[PathBuf::from(&a), PathBuf::from(&b)]).unwrap();

        assert_eq!(distributed, sequential);
    }
}

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::app::{Application, ReduceFn};
use crate::partition::{intermediate_path, output_path, partition, KeyValue};
use crate::task::TaskNumber;

/// Nombre del archivo que produce la ejecución secuencial de referencia.
pub const SEQUENTIAL_OUTPUT_NAME: &str = "mr-seq-out";

/// Escribe `path` de forma atómica: primero a un temporal en el mismo
/// directorio y después rename. Nadie ve nunca un archivo a medio escribir.
pub fn write_atomically<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/* =========================
   Map
   ========================= */

/// Ejecuta una tarea map:
///   1. lee el archivo de entrada completo
///   2. aplica la función map del usuario
///   3. reparte los pares en `n_reduce` buckets por hash de la clave
///   4. escribe un archivo `mr-<m>-<r>` por bucket (JSON, un registro por línea)
///
/// Se escriben todos los buckets, aunque queden vacíos.
pub fn run_map(
    app: &Application,
    task_number: TaskNumber,
    input_file: &str,
    n_reduce: usize,
    dir: &Path,
) -> io::Result<Vec<PathBuf>> {
    if n_reduce == 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "n_reduce = 0"));
    }

    let bytes = fs::read(input_file)?;
    let contents = String::from_utf8_lossy(&bytes);
    let kvs = (app.map)(input_file, &contents);
    debug!(
        "map {}: {} pares emitidos desde {}",
        task_number,
        kvs.len(),
        input_file
    );

    let mut written = Vec::with_capacity(n_reduce);
    for (reduce_task, bucket) in partition(kvs, n_reduce).into_iter().enumerate() {
        let path = intermediate_path(dir, task_number, reduce_task);
        write_atomically(&path, |w| write_records(w, &bucket))?;
        written.push(path);
    }

    Ok(written)
}

/// Cada registro se serializa por separado, así el reduce puede
/// decodificar en streaming sin cargar el archivo entero.
fn write_records<W: Write>(w: &mut W, records: &[KeyValue]) -> io::Result<()> {
    for kv in records {
        serde_json::to_writer(&mut *w, kv)?;
        w.write_all(b"\n")?;
    }
    Ok(())
}

/// Lee un archivo intermedio. Si no existe devuelve `Ok(None)`.
pub fn read_intermediate(path: &Path) -> io::Result<Option<Vec<KeyValue>>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let stream = serde_json::Deserializer::from_reader(BufReader::new(file)).into_iter::<KeyValue>();

    let mut out = Vec::new();
    for kv in stream {
        out.push(kv?);
    }
    Ok(Some(out))
}

/* =========================
   Reduce
   ========================= */

/// Ejecuta una tarea reduce:
///   1. junta `mr-<m>-<r>` de todas las tareas map (los que falten se saltean)
///   2. ordena por clave
///   3. aplica la función reduce a cada grupo de claves iguales
///   4. escribe `mr-out-<r>` con una línea `"<clave> <valor>"` por clave
pub fn run_reduce(
    app: &Application,
    reduce_task: TaskNumber,
    n_map: usize,
    dir: &Path,
) -> io::Result<PathBuf> {
    let mut intermediate: Vec<KeyValue> = Vec::new();
    for map_task in 0..n_map {
        let path = intermediate_path(dir, map_task, reduce_task);
        match read_intermediate(&path)? {
            Some(mut kvs) => intermediate.append(&mut kvs),
            None => debug!("reduce {}: {} no existe, lo salteo", reduce_task, path.display()),
        }
    }

    let out = output_path(dir, reduce_task);
    write_atomically(&out, |w| reduce_sorted(app.reduce, intermediate, w))?;
    Ok(out)
}

/// Ordena por clave (estable: respeta el orden de los valores) y escribe
/// una línea por cada grupo de claves iguales.
pub fn reduce_sorted<W: Write>(
    reduce: ReduceFn,
    mut kvs: Vec<KeyValue>,
    w: &mut W,
) -> io::Result<()> {
    kvs.sort_by(|a, b| a.key.cmp(&b.key));

    let mut i = 0;
    while i < kvs.len() {
        let mut j = i + 1;
        while j < kvs.len() && kvs[j].key == kvs[i].key {
            j += 1;
        }

        let values: Vec<String> = kvs[i..j].iter().map(|kv| kv.value.clone()).collect();
        let output = reduce(&kvs[i].key, &values);
        writeln!(w, "{} {}", kvs[i].key, output)?;

        i = j;
    }
    Ok(())
}

/* =========================
   Referencia secuencial
   ========================= */

/// Corre el job completo en un solo proceso, sin particionar,
/// y deja el resultado en `<dir>/mr-seq-out`.
pub fn run_sequential(app: &Application, files: &[String], dir: &Path) -> io::Result<PathBuf> {
    let mut all: Vec<KeyValue> = Vec::new();
    for f in files {
        let bytes = fs::read(f)?;
        let contents = String::from_utf8_lossy(&bytes);
        all.extend((app.map)(f, &contents));
    }

    let out = dir.join(SEQUENTIAL_OUTPUT_NAME);
    write_atomically(&out, |w| reduce_sorted(app.reduce, all, w))?;
    Ok(out)
}

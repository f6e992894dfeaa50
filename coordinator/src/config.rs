use std::{net::SocketAddr, time::Duration};

use anyhow::Result;
use clap::Parser;
use glob::glob;

use crate::state::CoordinatorConfig;

#[derive(Parser, Debug)]
#[command(name = "coordinator")]
#[command(about = "Coordinator MapReduce: reparte tareas map y reduce a los workers")]
pub struct Args {
    /// Dirección donde escucha el servidor HTTP
    #[arg(long, env = "MR_COORDINATOR_ADDR", default_value = "127.0.0.1:8080")]
    pub addr: SocketAddr,

    /// Cantidad de tareas reduce (buckets)
    #[arg(long, env = "MR_N_REDUCE", default_value_t = 10)]
    pub n_reduce: usize,

    /// Segundos sin reporte tras los cuales una tarea se reasigna
    #[arg(long, env = "MR_TASK_TIMEOUT_SECS", default_value_t = 10)]
    pub task_timeout_secs: u64,

    /// Intervalo del monitor de liveness, en milisegundos
    #[arg(long, env = "MR_SWEEP_INTERVAL_MS", default_value_t = 1000)]
    pub sweep_interval_ms: u64,

    /// Cada cuánto se consulta si el job terminó, en milisegundos
    #[arg(long, default_value_t = 1000)]
    pub done_poll_ms: u64,

    /// Máximo de asignaciones por tarea antes de dar el job por fallido (sin límite si no se pasa)
    #[arg(long, env = "MR_MAX_ATTEMPTS")]
    pub max_attempts: Option<u32>,

    /// Archivos de entrada (acepta patrones glob)
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<String>,
}

impl Args {
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            task_timeout: Duration::from_secs(self.task_timeout_secs),
            sweep_interval: Duration::from_millis(self.sweep_interval_ms),
            max_attempts: self.max_attempts,
        }
    }

    pub fn done_poll(&self) -> Duration {
        Duration::from_millis(self.done_poll_ms)
    }
}

/// Expande cada patrón glob a los archivos que matchean, en orden.
/// Un patrón que no matchea nada se deja tal cual: igual se vuelve una
/// tarea map, y falla de forma visible cuando el worker no lo pueda abrir.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let mut matched = false;
        for entry in glob(pattern)? {
            let path = entry?;
            if path.is_file() {
                files.push(path.to_string_lossy().to_string());
                matched = true;
            }
        }
        if !matched {
            files.push(pattern.clone());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn expand_inputs_expande_globs_y_conserva_literales() {
        let tmp = TempDir::new().unwrap();
        for name in ["pg-b.txt", "pg-a.txt", "otro.csv"] {
            fs::write(tmp.path().join(name), "x").unwrap();
        }
        let dir = tmp.path().to_string_lossy().to_string();

        let files = expand_inputs(&[
            format!("{}/pg-*.txt", dir),
            format!("{}/no-existe.txt", dir),
        ])
        .unwrap();

        assert_eq!(
            files,
            vec![
                format!("{}/pg-a.txt", dir),
                format!("{}/pg-b.txt", dir),
                format!("{}/no-existe.txt", dir),
            ]
        );
    }

    #[test]
    fn expand_inputs_rechaza_patron_invalido() {
        assert!(expand_inputs(&["[".to_string()]).is_err());
    }

    #[test]
    fn args_usa_defaults_y_arma_config() {
        let args = Args::try_parse_from(["coordinator", "a.txt", "b.txt"]).unwrap();
        assert_eq!(args.n_reduce, 10);
        assert_eq!(args.files, vec!["a.txt", "b.txt"]);

        let cfg = args.coordinator_config();
        assert_eq!(cfg.task_timeout, Duration::from_secs(10));
        assert_eq!(cfg.sweep_interval, Duration::from_secs(1));
        assert_eq!(cfg.max_attempts, None);
    }

    #[test]
    fn args_sin_archivos_es_error() {
        assert!(Args::try_parse_from(["coordinator"]).is_err());
    }
}

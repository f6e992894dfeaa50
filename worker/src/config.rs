use std::{env, path::PathBuf, time::Duration};

use anyhow::Result;
use common::{app, Application};

const DEFAULT_COORDINATOR_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Configuración del worker, leída de variables de entorno:
/// - MR_COORDINATOR_URL: URL base del coordinator (default http://127.0.0.1:8080)
/// - MR_WORK_DIR: directorio compartido para archivos intermedios y de salida (default ".")
/// - MR_APP: aplicación a ejecutar, "wc" o "indexer" (default "wc")
/// - MR_POLL_INTERVAL_MS: espera cuando no hay tareas (default 1000)
/// - MR_WORKER_ID: identidad para logs (default "<hostname>-<pid>")
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub coordinator_url: String,
    pub work_dir: PathBuf,
    pub app: Application,
    pub poll_interval: Duration,
    pub worker_id: String,
}

impl WorkerConfig {
    pub fn new(coordinator_url: impl Into<String>, work_dir: impl Into<PathBuf>, app: Application) -> Self {
        Self {
            coordinator_url: coordinator_url.into(),
            work_dir: work_dir.into(),
            app,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            worker_id: default_worker_id(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let url = env::var("MR_COORDINATOR_URL").unwrap_or_else(|_| DEFAULT_COORDINATOR_URL.to_string());
        let dir = env::var("MR_WORK_DIR").unwrap_or_else(|_| ".".to_string());
        let app = app::lookup(&env::var("MR_APP").unwrap_or_else(|_| "wc".to_string()))?;

        let mut config = Self::new(url, dir, app);

        config.poll_interval = env::var("MR_POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(config.poll_interval);

        if let Ok(id) = env::var("MR_WORKER_ID") {
            config.worker_id = id;
        }

        Ok(config)
    }
}

fn default_worker_id() -> String {
    let host = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    format!("{}-{}", host, std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_usa_defaults_razonables() {
        let c = WorkerConfig::new("http://localhost:9000", "/tmp/mr", app::WORDCOUNT);
        assert_eq!(c.coordinator_url, "http://localhost:9000");
        assert_eq!(c.work_dir, PathBuf::from("/tmp/mr"));
        assert_eq!(c.app.name, "wc");
        assert_eq!(c.poll_interval, Duration::from_secs(1));
        assert!(c.worker_id.ends_with(&format!("-{}", std::process::id())));
    }
}

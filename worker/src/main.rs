use anyhow::Result;
use tokio::{signal, sync::watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use worker::WorkerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("worker=info,reqwest=info")),
        )
        .init();

    let config = WorkerConfig::from_env()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C recibido, termino la tarea en curso y salgo");
            let _ = shutdown_tx.send(true);
        }
    });

    let stats = worker::run(config, shutdown_rx).await?;
    info!("worker finalizado: {:?}", stats);
    Ok(())
}

use anyhow::{bail, Result};
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::JobStatus;
use coordinator::{config, serve, Coordinator};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coordinator=info,tower_http=info")),
        )
        .init();

    let args = config::Args::parse();
    let files = config::expand_inputs(&args.files)?;
    let coordinator = Coordinator::new(files, args.n_reduce, args.coordinator_config())?;

    let listener = TcpListener::bind(args.addr).await?;

    tokio::select! {
        res = serve(listener, coordinator.clone(), args.done_poll()) => res?,
        _ = signal::ctrl_c() => {
            warn!("Ctrl-C recibido, el coordinator se detiene antes de terminar el job");
        }
    }

    let snapshot = coordinator.snapshot();
    info!(
        "estado final: {:?} (map {}/{} reduce {}/{})",
        snapshot.status,
        snapshot.map.completed,
        snapshot.n_map,
        snapshot.reduce.completed,
        snapshot.n_reduce
    );

    if snapshot.status == JobStatus::Failed {
        bail!("el job falló");
    }
    Ok(())
}

pub mod config;
pub mod failover;
pub mod handlers;
pub mod monitor;
pub mod state;

use std::{io, time::Duration};

use tokio::{net::TcpListener, time::sleep};
use tracing::info;

pub use state::{Completion, Coordinator, CoordinatorConfig};

/// Levanta el monitor de liveness y sirve HTTP hasta que el job termine.
/// Al terminar hace graceful shutdown: los workers que pregunten después
/// ya no encuentran al coordinator y salen.
pub async fn serve(
    listener: TcpListener,
    coordinator: Coordinator,
    done_poll: Duration,
) -> io::Result<()> {
    tokio::spawn(monitor::run_liveness_monitor(coordinator.clone()));

    let app = handlers::build_router(coordinator.clone());
    info!("coordinator escuchando en {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_until_done(coordinator, done_poll))
        .await
}

async fn wait_until_done(coordinator: Coordinator, every: Duration) {
    while !coordinator.done() {
        sleep(every).await;
    }
    info!("job terminado, cerrando el servidor");
}

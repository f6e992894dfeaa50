use std::{io, path::Path};

use anyhow::Result;
use common::{engine, Application, Phase, TaskAssignment, TaskCompleteRequest};
use tokio::{sync::watch, time::sleep};
use tracing::{debug, info, warn};

use crate::client::{CoordinatorClient, RpcError};
use crate::config::WorkerConfig;

/// Lo que hizo un worker durante su vida, para logs y tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub map_tasks: u64,
    pub reduce_tasks: u64,
    pub failed_tasks: u64,
}

impl WorkerStats {
    fn record(&mut self, phase: Phase, success: bool) {
        if !success {
            self.failed_tasks += 1;
            return;
        }
        match phase {
            Phase::Map => self.map_tasks += 1,
            Phase::Reduce => self.reduce_tasks += 1,
        }
    }
}

/// Ejecuta una tarea asignada contra el filesystem. Bloqueante.
pub fn execute(app: &Application, task: &TaskAssignment, dir: &Path) -> io::Result<()> {
    match task.task_type {
        Phase::Map => {
            let input = task.input_file.as_deref().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "tarea map sin input_file")
            })?;
            engine::run_map(app, task.task_number, input, task.n_reduce, dir)?;
        }
        Phase::Reduce => {
            engine::run_reduce(app, task.task_number, task.n_map, dir)?;
        }
    }
    Ok(())
}

/// Loop principal del worker:
/// - pide una tarea al coordinator
/// - si no hay, espera `poll_interval` y vuelve a preguntar
/// - si hay, la ejecuta y reporta éxito o fallo
///
/// Sale cuando el coordinator deja de responder (job terminado o abortado)
/// o cuando llega un pedido de shutdown. El shutdown se mira entre tareas:
/// una tarea empezada siempre se termina y se reporta.
pub async fn run(config: WorkerConfig, mut shutdown: watch::Receiver<bool>) -> Result<WorkerStats> {
    let client = CoordinatorClient::new(&config.coordinator_url)?;
    let worker_id = config.worker_id.clone();
    let mut stats = WorkerStats::default();

    info!(
        "worker {} arrancando contra {} (app={}, dir={})",
        worker_id,
        config.coordinator_url,
        config.app.name,
        config.work_dir.display()
    );

    loop {
        if *shutdown.borrow() {
            info!("worker {}: shutdown pedido, saliendo", worker_id);
            break;
        }

        let assignment = match client.assign(&worker_id).await {
            Ok(resp) => resp.task,
            Err(RpcError::Transport(e)) => {
                info!(
                    "worker {}: no se puede contactar al coordinator ({}), saliendo",
                    worker_id, e
                );
                break;
            }
            Err(e) => {
                warn!("worker {}: error pidiendo tarea: {}", worker_id, e);
                None
            }
        };

        let Some(task) = assignment else {
            debug!("worker {}: no hay tareas, esperando {:?}", worker_id, config.poll_interval);
            tokio::select! {
                _ = sleep(config.poll_interval) => {}
                changed = shutdown.changed() => {
                    // sin sender nadie puede pedir shutdown: sólo esperamos
                    if changed.is_err() {
                        sleep(config.poll_interval).await;
                    }
                }
            }
            continue;
        };

        info!(
            "worker {}: tengo tarea {:?} {} (attempt={})",
            worker_id, task.task_type, task.task_number, task.attempt
        );

        let app = config.app;
        let dir = config.work_dir.clone();
        let to_run = task.clone();
        let handle = tokio::task::spawn_blocking(move || execute(&app, &to_run, &dir));

        let success = match handle.await {
            Ok(Ok(())) => {
                info!(
                    "worker {}: terminé tarea {:?} {} correctamente",
                    worker_id, task.task_type, task.task_number
                );
                true
            }
            Ok(Err(e)) => {
                warn!(
                    "worker {}: error procesando tarea {:?} {}: {}",
                    worker_id, task.task_type, task.task_number, e
                );
                false
            }
            Err(e) => {
                warn!(
                    "worker {}: panic o join error en tarea {:?} {}: {:?}",
                    worker_id, task.task_type, task.task_number, e
                );
                false
            }
        };
        stats.record(task.task_type, success);

        let report = TaskCompleteRequest {
            task_type: task.task_type,
            task_number: task.task_number,
            attempt: task.attempt,
            success,
            worker_id: worker_id.clone(),
        };
        match client.complete(&report).await {
            Ok(ack) if !ack.acknowledged => {
                warn!(
                    "worker {}: el coordinator no reconoce la tarea {:?} {}",
                    worker_id, task.task_type, task.task_number
                );
            }
            Ok(_) => {}
            Err(e) if e.is_transport() => {
                info!(
                    "worker {}: no se puede reportar al coordinator ({}), saliendo",
                    worker_id, e
                );
                break;
            }
            Err(e) => warn!("worker {}: error reportando tarea: {}", worker_id, e),
        }
    }

    info!(
        "worker {} terminó: {} map, {} reduce, {} fallidas",
        worker_id, stats.map_tasks, stats.reduce_tasks, stats.failed_tasks
    );
    Ok(stats)
}

use common::{Task, TaskStatus};
use tracing::{info, warn};

/// Qué pasa con el job después de devolver una tarea al pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// La tarea vuelve a Idle y otro worker la puede tomar
    Retry,
    /// La tarea agotó sus intentos: el job falla
    JobFailed,
}

/// Devuelve una tarea InProgress a Idle (fallo reportado o timeout).
///
/// Con `max_attempts = None` se reintenta siempre. Con `Some(n)`, si la
/// tarea ya fue asignada `n` veces el job se marca como fallido.
pub fn release_task(task: &mut Task, max_attempts: Option<u32>, reason: &str) -> Release {
    task.status = TaskStatus::Idle;

    match max_attempts {
        Some(max) if task.attempt >= max => {
            warn!(
                "tarea {:?} {} superó el máximo de intentos ({}) tras {}, marcando job como FAILED",
                task.phase, task.task_number, max, reason
            );
            Release::JobFailed
        }
        _ => {
            info!(
                "tarea {:?} {} vuelve a idle por {} (attempt={})",
                task.phase, task.task_number, reason, task.attempt
            );
            Release::Retry
        }
    }
}

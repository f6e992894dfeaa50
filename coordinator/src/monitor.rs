use tokio::time::sleep;
use tracing::{debug, info};

use crate::state::Coordinator;

/// Monitor de liveness: cada `sweep_interval` devuelve a Idle las tareas
/// en progreso que llevan más de `task_timeout` sin reporte.
/// Es la única recuperación automática de workers caídos o colgados.
/// Termina cuando el job está hecho.
pub async fn run_liveness_monitor(coordinator: Coordinator) {
    let interval = coordinator.config().sweep_interval;

    loop {
        if coordinator.done() {
            info!("job terminado, el monitor de liveness se detiene");
            return;
        }

        let reset = coordinator.sweep_expired_tasks();
        if reset > 0 {
            info!("{} tareas vencidas volvieron a idle", reset);
        } else {
            debug!("sweep sin tareas vencidas");
        }

        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CoordinatorConfig;
    use common::{Phase, TaskCompleteRequest};
    use std::time::Duration;

    fn fast_config() -> CoordinatorConfig {
        CoordinatorConfig {
            task_timeout: Duration::from_millis(50),
            sweep_interval: Duration::from_millis(10),
            max_attempts: None,
        }
    }

    #[tokio::test]
    async fn monitor_reofrece_tarea_abandonada() {
        let c = Coordinator::new(vec!["a.txt".to_string()], 1, fast_config()).unwrap();
        let monitor = tokio::spawn(run_liveness_monitor(c.clone()));

        let first = c.assign_task("se-cuelga").unwrap();
        assert!(c.assign_task("otro").is_none());

        sleep(Duration::from_millis(300)).await;

        let again = c.assign_task("otro").expect("la tarea debería volver a idle");
        assert_eq!(again.task_number, first.task_number);
        assert!(again.attempt > first.attempt);

        monitor.abort();
    }

    #[tokio::test]
    async fn monitor_termina_cuando_el_job_esta_hecho() {
        let c = Coordinator::new(vec!["a.txt".to_string()], 1, fast_config()).unwrap();
        let monitor = tokio::spawn(run_liveness_monitor(c.clone()));

        for phase in [Phase::Map, Phase::Reduce] {
            let a = c.assign_task("w").unwrap();
            assert_eq!(a.task_type, phase);
            c.complete_task(&TaskCompleteRequest {
                task_type: a.task_type,
                task_number: a.task_number,
                attempt: a.attempt,
                success: true,
                worker_id: "w".to_string(),
            });
        }

        tokio::time::timeout(Duration::from_secs(2), monitor)
            .await
            .expect("el monitor no terminó")
            .unwrap();
        assert!(c.done());
    }
}

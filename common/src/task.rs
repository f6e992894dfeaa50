use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Índice denso de una tarea dentro de la tabla de su fase (0..n-1).
pub type TaskNumber = usize;

/// Fase del job y, a la vez, tipo de tarea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Map,
    Reduce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Idle,
    InProgress,
    Completed,
}

/// Registro de una tarea en la tabla del coordinator.
///
/// `phase`, `task_number` e `input_file` no cambian después de crearse;
/// `status`, `start_time` y `attempt` sólo los toca el coordinator con el lock tomado.
#[derive(Debug, Clone)]
pub struct Task {
    pub phase: Phase,
    pub status: TaskStatus,
    pub task_number: TaskNumber,

    /// Archivo de entrada, sólo para tareas Map
    pub input_file: Option<String>,

    /// Momento de la última asignación (reloj local del coordinator)
    pub start_time: Option<Instant>,

    /// Cuántas veces se asignó esta tarea. La asignación vigente es la última.
    pub attempt: u32,
}

impl Task {
    pub fn map(task_number: TaskNumber, input_file: impl Into<String>) -> Self {
        Self {
            phase: Phase::Map,
            status: TaskStatus::Idle,
            task_number,
            input_file: Some(input_file.into()),
            start_time: None,
            attempt: 0,
        }
    }

    pub fn reduce(task_number: TaskNumber) -> Self {
        Self {
            phase: Phase::Reduce,
            status: TaskStatus::Idle,
            task_number,
            input_file: None,
            start_time: None,
            attempt: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == TaskStatus::Idle
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == TaskStatus::InProgress
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Idle -> InProgress. Sella el tiempo de inicio y abre un nuevo intento.
    pub fn start(&mut self, now: Instant) {
        self.status = TaskStatus::InProgress;
        self.start_time = Some(now);
        self.attempt += 1;
    }

    /// En progreso y sin noticias del worker hace más de `timeout`.
    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        match (self.status, self.start_time) {
            (TaskStatus::InProgress, Some(started)) => {
                now.saturating_duration_since(started) > timeout
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_map_nace_idle_con_archivo() {
        let t = Task::map(3, "pg-1.txt");
        assert_eq!(t.phase, Phase::Map);
        assert!(t.is_idle());
        assert_eq!(t.task_number, 3);
        assert_eq!(t.input_file.as_deref(), Some("pg-1.txt"));
        assert_eq!(t.attempt, 0);
    }

    #[test]
    fn start_incrementa_intento_y_marca_en_progreso() {
        let mut t = Task::reduce(0);
        let now = Instant::now();
        t.start(now);
        assert!(t.is_in_progress());
        assert_eq!(t.start_time, Some(now));
        assert_eq!(t.attempt, 1);

        t.status = TaskStatus::Idle;
        t.start(now);
        assert_eq!(t.attempt, 2);
    }

    #[test]
    fn is_expired_solo_aplica_a_tareas_en_progreso() {
        let timeout = Duration::from_secs(10);
        let now = Instant::now();

        let idle = Task::reduce(0);
        assert!(!idle.is_expired(now + Duration::from_secs(60), timeout));

        let mut running = Task::reduce(1);
        running.start(now);
        assert!(!running.is_expired(now + Duration::from_secs(5), timeout));
        assert!(running.is_expired(now + Duration::from_secs(11), timeout));

        running.status = TaskStatus::Completed;
        assert!(!running.is_expired(now + Duration::from_secs(60), timeout));
    }

    #[test]
    fn phase_se_serializa_en_mayusculas() {
        let s = serde_json::to_string(&Phase::Reduce).unwrap();
        assert_eq!(s, "\"REDUCE\"");
        let st = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(st, "\"IN_PROGRESS\"");
    }
}

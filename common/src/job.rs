use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Phase, Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Running,
    Failed,
    Succeeded,
}

/// Conteo de tareas por estado dentro de una fase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCounts {
    pub idle: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl PhaseCounts {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut counts = PhaseCounts::default();
        for t in tasks {
            match t.status {
                TaskStatus::Idle => counts.idle += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.idle + self.in_progress + self.completed
    }
}

/// Foto del job tal como la ve el coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub phase: Phase,
    pub n_map: usize,
    pub n_reduce: usize,

    pub map: PhaseCounts,
    pub reduce: PhaseCounts,

    /// -------- Métricas del job --------
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

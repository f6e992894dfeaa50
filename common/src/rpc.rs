use serde::{Deserialize, Serialize};

use crate::task::{Phase, TaskNumber};

/// Identidad del worker. Sólo se usa para logs, nunca para autorizar.
pub type WorkerId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignmentRequest {
    pub worker_id: WorkerId,
}

/// Descriptor de una tarea asignada, con las constantes del job
/// que el worker necesita para calcular nombres de archivo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub task_type: Phase,
    pub task_number: TaskNumber,

    /// Sólo viene en tareas Map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,

    pub n_reduce: usize,
    pub n_map: usize,

    /// Intento vigente; el worker lo devuelve tal cual al reportar
    pub attempt: u32,
}

/// `task: None` significa "no hay tarea ahora, volvé a preguntar más tarde".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignmentResponse {
    pub task: Option<TaskAssignment>,
}

impl TaskAssignmentResponse {
    pub fn no_task() -> Self {
        Self { task: None }
    }

    pub fn is_no_task(&self) -> bool {
        self.task.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCompleteRequest {
    pub task_type: Phase,
    pub task_number: TaskNumber,
    pub attempt: u32,
    pub success: bool,
    pub worker_id: WorkerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCompleteResponse {
    pub acknowledged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDoneResponse {
    pub done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn asignacion_reduce_no_serializa_input_file() {
        let a = TaskAssignment {
            task_type: Phase::Reduce,
            task_number: 2,
            input_file: None,
            n_reduce: 3,
            n_map: 8,
            attempt: 1,
        };
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(
            v,
            json!({
                "task_type": "REDUCE",
                "task_number": 2,
                "n_reduce": 3,
                "n_map": 8,
                "attempt": 1
            })
        );
    }

    #[test]
    fn respuesta_sin_tarea_es_null() {
        let r = TaskAssignmentResponse::no_task();
        assert!(r.is_no_task());
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v, json!({ "task": null }));

        let back: TaskAssignmentResponse = serde_json::from_value(v).unwrap();
        assert!(back.is_no_task());
    }
}

// coordinator/src/state.rs

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use anyhow::{ensure, Result};
use chrono::{DateTime, Utc};
use common::{
    JobSnapshot, JobStatus, Phase, PhaseCounts, Task, TaskAssignment, TaskCompleteRequest,
    TaskStatus,
};
use tracing::{info, warn};

use crate::failover::{release_task, Release};

pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Tiempo sin reporte tras el cual una tarea en progreso se da por abandonada
    pub task_timeout: Duration,
    /// Cada cuánto corre el monitor de liveness
    pub sweep_interval: Duration,
    /// `None` = reintentos ilimitados
    pub max_attempts: Option<u32>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            task_timeout: DEFAULT_TASK_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            max_attempts: None,
        }
    }
}

/// Resultado de aplicar un reporte de fin de tarea.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// La tarea estaba en progreso con ese intento y cambió de estado
    Applied,
    /// Reporte duplicado o tardío: se acusa recibo pero no cambia nada
    Ignored,
    /// El número de tarea no existe en la tabla
    UnknownTask,
}

/// Tabla de tareas de ambas fases. Todo acceso pasa por el lock de `Coordinator`.
#[derive(Debug)]
struct JobTable {
    map_tasks: Vec<Task>,
    reduce_tasks: Vec<Task>,
    phase: Phase,
    done: bool,
    failed: bool,

    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl JobTable {
    fn tasks(&self, phase: Phase) -> &[Task] {
        match phase {
            Phase::Map => &self.map_tasks,
            Phase::Reduce => &self.reduce_tasks,
        }
    }

    fn tasks_mut(&mut self, phase: Phase) -> &mut [Task] {
        match phase {
            Phase::Map => &mut self.map_tasks,
            Phase::Reduce => &mut self.reduce_tasks,
        }
    }

    fn all_completed(&self, phase: Phase) -> bool {
        self.tasks(phase).iter().all(Task::is_completed)
    }

    /// Toma la primera tarea Idle (menor número) de la fase y la pasa a InProgress.
    fn take_idle(&mut self, phase: Phase, now: Instant) -> Option<TaskAssignment> {
        let n_map = self.map_tasks.len();
        let n_reduce = self.reduce_tasks.len();

        let task = self.tasks_mut(phase).iter_mut().find(|t| t.is_idle())?;
        task.start(now);

        Some(TaskAssignment {
            task_type: task.phase,
            task_number: task.task_number,
            input_file: task.input_file.clone(),
            n_reduce,
            n_map,
            attempt: task.attempt,
        })
    }

    fn mark_failed(&mut self) {
        if !self.failed {
            self.failed = true;
            self.finished_at = Some(Utc::now());
        }
    }
}

/// Dueño único de la tabla de tareas del job.
///
/// Todas las operaciones toman el mismo lock durante todo su cuerpo,
/// no bloquean y son O(tamaño de la tabla).
#[derive(Debug, Clone)]
pub struct Coordinator {
    table: Arc<Mutex<JobTable>>,
    config: CoordinatorConfig,
}

impl Coordinator {
    /// Crea el job: una tarea map por archivo, todas Idle, y la tabla de
    /// reduce ya dimensionada a `n_reduce`.
    pub fn new(files: Vec<String>, n_reduce: usize, config: CoordinatorConfig) -> Result<Self> {
        ensure!(!files.is_empty(), "el job necesita al menos un archivo de entrada");
        ensure!(n_reduce >= 1, "n_reduce debe ser >= 1");

        let map_tasks: Vec<Task> = files
            .into_iter()
            .enumerate()
            .map(|(i, f)| Task::map(i, f))
            .collect();
        let reduce_tasks: Vec<Task> = (0..n_reduce).map(Task::reduce).collect();

        info!(
            "job creado: {} tareas map, {} tareas reduce (timeout={:?}, max_attempts={:?})",
            map_tasks.len(),
            reduce_tasks.len(),
            config.task_timeout,
            config.max_attempts
        );

        Ok(Self {
            table: Arc::new(Mutex::new(JobTable {
                map_tasks,
                reduce_tasks,
                phase: Phase::Map,
                done: false,
                failed: false,
                started_at: Utc::now(),
                finished_at: None,
            })),
            config,
        })
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    // Ninguna sección crítica deja la tabla a medio actualizar,
    // así que un lock envenenado se puede seguir usando.
    fn lock(&self) -> MutexGuard<'_, JobTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// AssignTasks: devuelve la siguiente tarea Idle de la fase actual,
    /// o `None` si por ahora no hay nada para repartir.
    pub fn assign_task(&self, worker_id: &str) -> Option<TaskAssignment> {
        self.assign_task_at(worker_id, Instant::now())
    }

    pub(crate) fn assign_task_at(&self, worker_id: &str, now: Instant) -> Option<TaskAssignment> {
        let mut table = self.lock();

        if table.failed {
            return None;
        }

        let current = table.phase;
        if let Some(a) = table.take_idle(current, now) {
            info!(
                "asignando tarea {:?} {} (attempt={}) al worker {}",
                a.task_type, a.task_number, a.attempt, worker_id
            );
            return Some(a);
        }

        // Sin Idle en map: si todas terminaron pasamos a reduce en esta misma llamada
        if current == Phase::Map && table.all_completed(Phase::Map) {
            table.phase = Phase::Reduce;
            info!("todas las tareas map completadas, pasando a fase REDUCE");

            if let Some(a) = table.take_idle(Phase::Reduce, now) {
                info!(
                    "asignando tarea {:?} {} (attempt={}) al worker {}",
                    a.task_type, a.task_number, a.attempt, worker_id
                );
                return Some(a);
            }
        }

        None
    }

    /// TaskComplete: sólo tiene efecto si la tarea está InProgress con el
    /// mismo intento que se reporta. Éxito -> Completed, fallo -> Idle.
    pub fn complete_task(&self, req: &TaskCompleteRequest) -> Completion {
        let max_attempts = self.config.max_attempts;
        let mut table = self.lock();

        let Some(task) = table.tasks_mut(req.task_type).get_mut(req.task_number) else {
            warn!(
                "worker {} reportó tarea {:?} {} que no existe",
                req.worker_id, req.task_type, req.task_number
            );
            return Completion::UnknownTask;
        };

        if !task.is_in_progress() || task.attempt != req.attempt {
            info!(
                "ignorando reporte de worker {} para tarea {:?} {} (attempt={}, estado={:?}, attempt vigente={})",
                req.worker_id, req.task_type, req.task_number, req.attempt, task.status, task.attempt
            );
            return Completion::Ignored;
        }

        if req.success {
            task.status = TaskStatus::Completed;
            info!(
                "tarea {:?} {} completada por worker {}",
                req.task_type, req.task_number, req.worker_id
            );
        } else if release_task(task, max_attempts, "fallo reportado") == Release::JobFailed {
            table.mark_failed();
        }

        Completion::Applied
    }

    /// Una pasada del monitor de liveness. Devuelve cuántas tareas volvieron a Idle.
    pub fn sweep_expired_tasks(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    pub(crate) fn sweep_expired_at(&self, now: Instant) -> usize {
        let timeout = self.config.task_timeout;
        let max_attempts = self.config.max_attempts;

        let mut guard = self.lock();
        let table = &mut *guard;

        let mut reset = 0;
        let mut exhausted = false;
        for task in table.map_tasks.iter_mut().chain(table.reduce_tasks.iter_mut()) {
            if task.is_expired(now, timeout) {
                reset += 1;
                if release_task(task, max_attempts, "timeout") == Release::JobFailed {
                    exhausted = true;
                }
            }
        }

        if exhausted {
            table.mark_failed();
        }
        reset
    }

    /// Done: pegajoso. Una vez que devuelve true no vuelve a false.
    /// Un job fallido también cuenta como terminado.
    pub fn done(&self) -> bool {
        let mut table = self.lock();

        if table.done {
            return true;
        }

        if table.failed {
            table.done = true;
            return true;
        }

        if table.phase == Phase::Map {
            return false;
        }

        if table.all_completed(Phase::Reduce) {
            table.done = true;
            table.finished_at = Some(Utc::now());
            info!("todas las tareas reduce completadas, job terminado");
            return true;
        }

        false
    }

    pub fn snapshot(&self) -> JobSnapshot {
        let table = self.lock();

        let status = if table.failed {
            JobStatus::Failed
        } else if table.phase == Phase::Reduce && table.all_completed(Phase::Reduce) {
            JobStatus::Succeeded
        } else {
            JobStatus::Running
        };

        JobSnapshot {
            status,
            phase: table.phase,
            n_map: table.map_tasks.len(),
            n_reduce: table.reduce_tasks.len(),
            map: PhaseCounts::from_tasks(&table.map_tasks),
            reduce: PhaseCounts::from_tasks(&table.reduce_tasks),
            started_at: table.started_at,
            finished_at: table.finished_at,
        }
    }
}

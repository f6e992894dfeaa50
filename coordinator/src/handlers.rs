use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use common::{
    JobDoneResponse, JobSnapshot, TaskAssignmentRequest, TaskAssignmentResponse,
    TaskCompleteRequest, TaskCompleteResponse,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::state::{Completion, Coordinator};

pub fn build_router(coordinator: Coordinator) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/job", get(get_job))
        .route("/api/v1/job/done", get(job_done))
        .route("/api/v1/tasks/next", post(assign_task))
        .route("/api/v1/tasks/complete", post(complete_task))
        .layer(TraceLayer::new_for_http())
        .with_state(coordinator)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

async fn get_job(State(coordinator): State<Coordinator>) -> Json<JobSnapshot> {
    Json(coordinator.snapshot())
}

async fn job_done(State(coordinator): State<Coordinator>) -> Json<JobDoneResponse> {
    Json(JobDoneResponse {
        done: coordinator.done(),
    })
}

// Asigna la siguiente tarea Idle de la fase actual (si hay)
async fn assign_task(
    State(coordinator): State<Coordinator>,
    Json(req): Json<TaskAssignmentRequest>,
) -> Json<TaskAssignmentResponse> {
    match coordinator.assign_task(&req.worker_id) {
        Some(task) => Json(TaskAssignmentResponse { task: Some(task) }),
        None => {
            debug!("worker {} pidió tarea pero no hay", req.worker_id);
            Json(TaskAssignmentResponse::no_task())
        }
    }
}

// Worker reporta que terminó una tarea. Siempre se acusa recibo,
// salvo que la tarea no exista.
async fn complete_task(
    State(coordinator): State<Coordinator>,
    Json(req): Json<TaskCompleteRequest>,
) -> Json<TaskCompleteResponse> {
    let acknowledged = match coordinator.complete_task(&req) {
        Completion::Applied | Completion::Ignored => true,
        Completion::UnknownTask => false,
    };
    Json(TaskCompleteResponse { acknowledged })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CoordinatorConfig;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use common::{JobStatus, Phase, TaskAssignment};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> (Coordinator, Router) {
        let c = Coordinator::new(
            vec!["a.txt".to_string(), "b.txt".to_string()],
            1,
            CoordinatorConfig::default(),
        )
        .unwrap();
        (c.clone(), build_router(c))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_responde_ok() {
        let (_, app) = router();
        let res = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn next_entrega_tareas_y_luego_sin_tarea() {
        let (_, app) = router();

        for expected in 0..2 {
            let (status, v) =
                call(&app, "POST", "/api/v1/tasks/next", Some(json!({ "worker_id": "w1" }))).await;
            assert_eq!(status, StatusCode::OK);
            let task: TaskAssignment = serde_json::from_value(v["task"].clone()).unwrap();
            assert_eq!(task.task_type, Phase::Map);
            assert_eq!(task.task_number, expected);
            assert_eq!(task.n_map, 2);
            assert_eq!(task.n_reduce, 1);
        }

        let (_, v) = call(&app, "POST", "/api/v1/tasks/next", Some(json!({ "worker_id": "w1" }))).await;
        assert_eq!(v, json!({ "task": null }));
    }

    #[tokio::test]
    async fn complete_acusa_recibo_de_duplicados_pero_no_de_tareas_inexistentes() {
        let (c, app) = router();
        let a = c.assign_task("w1").unwrap();

        let report = json!({
            "task_type": "MAP",
            "task_number": a.task_number,
            "attempt": a.attempt,
            "success": true,
            "worker_id": "w1"
        });
        for _ in 0..2 {
            let (status, v) = call(&app, "POST", "/api/v1/tasks/complete", Some(report.clone())).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(v, json!({ "acknowledged": true }));
        }
        assert_eq!(c.snapshot().map.completed, 1);

        let bogus = json!({
            "task_type": "REDUCE",
            "task_number": 7,
            "attempt": 1,
            "success": true,
            "worker_id": "w1"
        });
        let (status, v) = call(&app, "POST", "/api/v1/tasks/complete", Some(bogus)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v, json!({ "acknowledged": false }));
    }

    #[tokio::test]
    async fn job_y_done_reflejan_el_estado() {
        let (c, app) = router();

        let (_, v) = call(&app, "GET", "/api/v1/job/done", None).await;
        assert_eq!(v, json!({ "done": false }));

        let (status, v) = call(&app, "GET", "/api/v1/job", None).await;
        assert_eq!(status, StatusCode::OK);
        let snap: JobSnapshot = serde_json::from_value(v).unwrap();
        assert_eq!(snap.status, JobStatus::Running);
        assert_eq!(snap.map.idle, 2);

        while let Some(a) = c.assign_task("w") {
            c.complete_task(&TaskCompleteRequest {
                task_type: a.task_type,
                task_number: a.task_number,
                attempt: a.attempt,
                success: true,
                worker_id: "w".to_string(),
            });
        }

        let (_, v) = call(&app, "GET", "/api/v1/job/done", None).await;
        assert_eq!(v, json!({ "done": true }));
        let (_, v) = call(&app, "GET", "/api/v1/job", None).await;
        assert_eq!(v["status"], json!("SUCCEEDED"));
        assert_eq!(v["phase"], json!("REDUCE"));
    }

    #[tokio::test]
    async fn body_invalido_es_rechazado() {
        let (_, app) = router();
        let (status, _) = call(&app, "POST", "/api/v1/tasks/next", Some(json!({ "nada": 1 }))).await;
        assert!(status.is_client_error());
    }
}

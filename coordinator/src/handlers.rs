use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use common::{Assignment, CompletionAck, DoneResponse, JobStatus, Task, TaskRequest};
use tower_http::trace::TraceLayer;

use crate::state::Coordinator;

pub fn build_router(coordinator: Coordinator) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/tasks/next", post(assign_task))
        .route("/api/v1/tasks/complete", post(complete_task))
        .route("/api/v1/job", get(get_job))
        .route("/api/v1/job/done", get(job_done))
        .layer(TraceLayer::new_for_http())
        .with_state(coordinator)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// RequestTask: siguiente tarea, Wait o Exit
async fn assign_task(
    State(coordinator): State<Coordinator>,
    Json(req): Json<TaskRequest>,
) -> Json<Assignment> {
    Json(coordinator.request_task(&req.worker_id))
}

// ReportCompletion: un reporte obsoleto no es un error, sólo accepted=false
async fn complete_task(
    State(coordinator): State<Coordinator>,
    Json(task): Json<Task>,
) -> Json<CompletionAck> {
    let accepted = coordinator.report_completion(task);
    Json(CompletionAck { accepted })
}

async fn get_job(State(coordinator): State<Coordinator>) -> Json<JobStatus> {
    Json(coordinator.status())
}

// IsDone, para el lanzador del job
async fn job_done(State(coordinator): State<Coordinator>) -> Json<DoneResponse> {
    Json(DoneResponse {
        done: coordinator.is_done(),
    })
}

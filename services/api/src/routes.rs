use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use job_scout::workflows::applications::{application_router, ApplicationDesk, ApplicationRepository};
use job_scout::workflows::jobs::{JobRepository, ScoreRepository};
use job_scout::workflows::notifications::NotificationDispatcher;
use job_scout::workflows::pipeline::{job_router, JobPipeline};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_job_routes<R, S, D, A>(
    pipeline: Arc<JobPipeline<R, S, D>>,
    desk: Arc<ApplicationDesk<A, D>>,
) -> axum::Router
where
    R: JobRepository + 'static,
    S: ScoreRepository + 'static,
    D: NotificationDispatcher + 'static,
    A: ApplicationRepository + 'static,
{
    job_router(pipeline)
        .merge(application_router(desk))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

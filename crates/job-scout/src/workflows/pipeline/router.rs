use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::error;

use super::{JobPipeline, PipelineError};
use crate::error::AppError;
use crate::workflows::ingest::RawJobRecord;
use crate::workflows::jobs::{JobRepository, ScoreRepository};
use crate::workflows::matching::UserProfile;
use crate::workflows::notifications::NotificationDispatcher;

/// Router builder exposing ingest, scoring, matching, notification and maintenance endpoints.
pub fn job_router<R, S, D>(pipeline: Arc<JobPipeline<R, S, D>>) -> Router
where
    R: JobRepository + 'static,
    S: ScoreRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    Router::new()
        .route("/api/v1/jobs/ingest", post(ingest_handler::<R, S, D>))
        .route("/api/v1/jobs/score", post(score_handler::<R, S, D>))
        .route("/api/v1/jobs/matches", post(matches_handler::<R, S, D>))
        .route("/api/v1/jobs/scores", get(scores_handler::<R, S, D>))
        .route("/api/v1/jobs/notify", post(notify_handler::<R, S, D>))
        .route("/api/v1/jobs/maintenance", post(maintenance_handler::<R, S, D>))
        .with_state(pipeline)
}

pub(crate) async fn ingest_handler<R, S, D>(
    State(pipeline): State<Arc<JobPipeline<R, S, D>>>,
    Json(records): Json<Vec<RawJobRecord>>,
) -> Response
where
    R: JobRepository + 'static,
    S: ScoreRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    match pipeline.ingest(&records, Utc::now()) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn score_handler<R, S, D>(
    State(pipeline): State<Arc<JobPipeline<R, S, D>>>,
) -> Response
where
    R: JobRepository + 'static,
    S: ScoreRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    match pipeline.score_stale(Utc::now()) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn matches_handler<R, S, D>(
    State(pipeline): State<Arc<JobPipeline<R, S, D>>>,
    Json(profile): Json<UserProfile>,
) -> Response
where
    R: JobRepository + 'static,
    S: ScoreRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    match pipeline.matches_for(&profile) {
        Ok(matches) => {
            let payload = json!({
                "user_id": profile.user_id,
                "count": matches.len(),
                "jobs": matches,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn scores_handler<R, S, D>(
    State(pipeline): State<Arc<JobPipeline<R, S, D>>>,
) -> Response
where
    R: JobRepository + 'static,
    S: ScoreRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    match pipeline.scores() {
        Ok(scores) => (StatusCode::OK, Json(scores)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn notify_handler<R, S, D>(
    State(pipeline): State<Arc<JobPipeline<R, S, D>>>,
    Json(profiles): Json<Vec<UserProfile>>,
) -> Response
where
    R: JobRepository + 'static,
    S: ScoreRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    match pipeline.notify(&profiles) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn maintenance_handler<R, S, D>(
    State(pipeline): State<Arc<JobPipeline<R, S, D>>>,
) -> Response
where
    R: JobRepository + 'static,
    S: ScoreRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    match pipeline.run_maintenance(Utc::now()) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: PipelineError) -> Response {
    let error = AppError::from(error);
    error!(%error, status = error.status().as_u16(), "job pipeline request failed");
    error.into_response()
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::warn;

use super::domain::ApplicationStatus;
use super::repository::ApplicationRepository;
use super::tracker::{ApplicationError, ApplicationTracker, ReminderReport};
use crate::error::AppError;
use crate::workflows::matching::UserId;
use crate::workflows::notifications::NotificationDispatcher;

/// Tracker plus the dispatcher its reminders go out through.
pub struct ApplicationDesk<R, D> {
    tracker: ApplicationTracker<R>,
    dispatcher: Arc<D>,
}

impl<R, D> ApplicationDesk<R, D>
where
    R: ApplicationRepository,
    D: NotificationDispatcher,
{
    pub fn new(repository: Arc<R>, dispatcher: Arc<D>) -> Self {
        Self {
            tracker: ApplicationTracker::new(repository),
            dispatcher,
        }
    }

    pub fn tracker(&self) -> &ApplicationTracker<R> {
        &self.tracker
    }

    /// Sends every reminder due as of the current UTC date.
    pub fn dispatch_due_reminders(&self) -> Result<ReminderReport, ApplicationError> {
        let now = Utc::now();
        self.tracker
            .dispatch_due_reminders(now.date_naive(), self.dispatcher.as_ref(), now)
    }
}

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    pub user_id: UserId,
    pub source_url: String,
    pub job_title: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub user_id: UserId,
    pub source_url: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReminderRequest {
    pub user_id: UserId,
    pub source_url: String,
    pub reminder_date: Option<NaiveDate>,
}

/// Router builder exposing application tracking and the reminder sweep.
pub fn application_router<R, D>(desk: Arc<ApplicationDesk<R, D>>) -> Router
where
    R: ApplicationRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(track_handler::<R, D>))
        .route("/api/v1/applications/status", post(status_handler::<R, D>))
        .route("/api/v1/applications/reminder", post(reminder_handler::<R, D>))
        .route(
            "/api/v1/applications/reminders/dispatch",
            post(dispatch_handler::<R, D>),
        )
        .route("/api/v1/applications/:user_id", get(list_handler::<R, D>))
        .with_state(desk)
}

async fn track_handler<R, D>(
    State(desk): State<Arc<ApplicationDesk<R, D>>>,
    Json(request): Json<TrackRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    match desk.tracker.track(
        request.user_id,
        &request.source_url,
        &request.job_title,
        Utc::now(),
    ) {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn status_handler<R, D>(
    State(desk): State<Arc<ApplicationDesk<R, D>>>,
    Json(request): Json<StatusRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    let now = Utc::now();
    let updated = desk
        .tracker
        .update_status(&request.user_id, &request.source_url, request.status, now)
        .and_then(|application| match request.notes.as_deref() {
            Some(notes) => desk
                .tracker
                .annotate(&request.user_id, &request.source_url, notes, now),
            None => Ok(application),
        });

    match updated {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn reminder_handler<R, D>(
    State(desk): State<Arc<ApplicationDesk<R, D>>>,
    Json(request): Json<ReminderRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    match desk.tracker.set_reminder(
        &request.user_id,
        &request.source_url,
        request.reminder_date,
        Utc::now(),
    ) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn list_handler<R, D>(
    State(desk): State<Arc<ApplicationDesk<R, D>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    match desk.tracker.for_user(&UserId(user_id)) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn dispatch_handler<R, D>(State(desk): State<Arc<ApplicationDesk<R, D>>>) -> Response
where
    R: ApplicationRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    match desk.dispatch_due_reminders() {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ApplicationError) -> Response {
    let error = AppError::from(error);
    warn!(%error, status = error.status().as_u16(), "application request failed");
    error.into_response()
}

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::applications::ApplicationError;
use crate::workflows::ingest::{IngestError, SourceError};
use crate::workflows::jobs::RepositoryError;
use crate::workflows::pipeline::PipelineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Source(SourceError),
    Pipeline(PipelineError),
    Application(ApplicationError),
}

impl AppError {
    /// HTTP status for the failure; repository outages surface as 503.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Source(_) => StatusCode::BAD_REQUEST,
            AppError::Pipeline(
                PipelineError::Repository(err) | PipelineError::Ingest(IngestError::Repository(err)),
            ) => repository_status(err),
            AppError::Application(ApplicationError::AlreadyTracked { .. }) => StatusCode::CONFLICT,
            AppError::Application(ApplicationError::NotTracked { .. }) => StatusCode::NOT_FOUND,
            AppError::Application(ApplicationError::Repository(err)) => repository_status(err),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn repository_status(error: &RepositoryError) -> StatusCode {
    match error {
        RepositoryError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        RepositoryError::Conflict => StatusCode::CONFLICT,
        RepositoryError::NotFound => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Source(err) => write!(f, "job source error: {}", err),
            AppError::Pipeline(err) => write!(f, "pipeline error: {}", err),
            AppError::Application(err) => write!(f, "application error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Source(err) => Some(err),
            AppError::Pipeline(err) => Some(err),
            AppError::Application(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<SourceError> for AppError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

impl From<PipelineError> for AppError {
    fn from(value: PipelineError) -> Self {
        Self::Pipeline(value)
    }
}

impl From<IngestError> for AppError {
    fn from(value: IngestError) -> Self {
        Self::Pipeline(PipelineError::Ingest(value))
    }
}

impl From<ApplicationError> for AppError {
    fn from(value: ApplicationError) -> Self {
        Self::Application(value)
    }
}

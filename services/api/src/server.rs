use crate::cli::ServeArgs;
use crate::infra::{build_desk, build_pipeline, run_sweeps, AppState};
use crate::routes::with_job_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_scout::config::AppConfig;
use job_scout::error::AppError;
use job_scout::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let pipeline = Arc::new(build_pipeline(config.pipeline));
    let desk = Arc::new(build_desk());
    tokio::spawn(run_sweeps(pipeline.clone(), desk.clone()));

    let app = with_job_routes(pipeline, desk)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        freshness_hours = config.pipeline.score_freshness_hours,
        stale_after_days = config.pipeline.stale_after_days,
        sweep_interval_minutes = config.pipeline.sweep_interval_minutes,
        "job scout service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

use chrono::{DateTime, Utc};
use job_scout::config::PipelineConfig;
use job_scout::workflows::applications::{ApplicationDesk, InMemoryApplicationStore};
use job_scout::workflows::jobs::InMemoryJobStore;
use job_scout::workflows::notifications::{
    DispatchError, JobNotification, NotificationDispatcher,
};
use job_scout::workflows::pipeline::JobPipeline;
use job_scout::workflows::scoring::ScoringEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ServicePipeline = JobPipeline<InMemoryJobStore, InMemoryJobStore, LoggingDispatcher>;
pub(crate) type ServiceDesk = ApplicationDesk<InMemoryApplicationStore, LoggingDispatcher>;

/// Stands in for a chat transport by writing each notification to the log.
#[derive(Default, Clone)]
pub(crate) struct LoggingDispatcher;

impl NotificationDispatcher for LoggingDispatcher {
    fn dispatch(&self, notification: JobNotification) -> Result<(), DispatchError> {
        let summary = notification.summary();
        match &notification {
            JobNotification::Digest { chat_id, .. } if chat_id.trim().is_empty() => {
                Err(DispatchError::MissingRecipient)
            }
            JobNotification::Digest { user_id, chat_id, .. } => {
                info!(%user_id, %chat_id, %summary, "job digest");
                Ok(())
            }
            JobNotification::ApplicationReminder { user_id, .. } => {
                info!(%user_id, %summary, "application reminder");
                Ok(())
            }
        }
    }
}

/// Pipeline over one in-memory store shared by jobs and scores.
pub(crate) fn build_pipeline(settings: PipelineConfig) -> ServicePipeline {
    let store = Arc::new(InMemoryJobStore::default());
    JobPipeline::new(
        store.clone(),
        store,
        Arc::new(LoggingDispatcher),
        ScoringEngine::default(),
        settings,
    )
}

pub(crate) fn build_desk() -> ServiceDesk {
    ApplicationDesk::new(
        Arc::new(InMemoryApplicationStore::default()),
        Arc::new(LoggingDispatcher),
    )
}

/// One maintenance pass plus the reminder sweep; failures are logged and retried next tick.
pub(crate) fn sweep_once(pipeline: &ServicePipeline, desk: &ServiceDesk, now: DateTime<Utc>) {
    if let Err(error) = pipeline.run_maintenance(now) {
        warn!(%error, "job maintenance failed");
    }
    if let Err(error) = desk.dispatch_due_reminders() {
        warn!(%error, "application reminder sweep failed");
    }
}

pub(crate) async fn run_sweeps(pipeline: Arc<ServicePipeline>, desk: Arc<ServiceDesk>) {
    let mut ticker = tokio::time::interval(pipeline.settings().sweep_interval());
    loop {
        ticker.tick().await;
        sweep_once(&pipeline, &desk, Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use job_scout::workflows::matching::UserId;

    #[test]
    fn digests_without_a_chat_are_rejected() {
        let dispatcher = LoggingDispatcher;
        let result = dispatcher.dispatch(JobNotification::Digest {
            user_id: UserId("u-1".to_string()),
            chat_id: " ".to_string(),
            jobs: Vec::new(),
        });
        match result {
            Err(DispatchError::MissingRecipient) => {}
            other => panic!("expected missing recipient, got {other:?}"),
        }

        dispatcher
            .dispatch(JobNotification::Digest {
                user_id: UserId("u-1".to_string()),
                chat_id: "42".to_string(),
                jobs: Vec::new(),
            })
            .expect("digest logged");
    }

    #[test]
    fn sweep_retires_jobs_unseen_past_the_window() {
        use chrono::{Duration, TimeZone};
        use job_scout::workflows::ingest::RawJobRecord;
        use job_scout::workflows::jobs::JobRepository;

        let store = Arc::new(InMemoryJobStore::default());
        let pipeline = JobPipeline::new(
            store.clone(),
            store.clone(),
            Arc::new(LoggingDispatcher),
            ScoringEngine::default(),
            PipelineConfig::default(),
        );
        let observed = Utc.with_ymd_and_hms(2025, 9, 24, 10, 0, 0).unwrap();
        let record = RawJobRecord {
            title: Some("Developer".to_string()),
            url: Some("https://www.cv.ee/1".to_string()),
            ..RawJobRecord::default()
        };
        pipeline.ingest(&[record], observed).expect("ingest");

        sweep_once(&pipeline, &build_desk(), observed + Duration::days(61));

        assert!(store.active().expect("active").is_empty());
    }
}

use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::config::PipelineConfig;
use crate::workflows::ingest::{RawJobRecord, SalaryField};
use crate::workflows::jobs::{
    Company, InMemoryJobStore, Job, JobRepository, JobScore, JobUpsert, RepositoryError,
    ScoreRepository,
};
use crate::workflows::matching::{SkillSet, UserProfile};
use crate::workflows::notifications::{DispatchError, JobNotification, NotificationDispatcher};
use crate::workflows::pipeline::{job_router, JobPipeline};
use crate::workflows::scoring::ScoringEngine;

pub(super) type MemoryPipeline = JobPipeline<InMemoryJobStore, InMemoryJobStore, RecordingDispatcher>;

pub(super) fn observed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 24, 10, 0, 0).unwrap()
}

pub(super) fn python_posting() -> RawJobRecord {
    RawJobRecord {
        title: Some("Senior Python Developer".to_string()),
        company: Some("Acme".to_string()),
        location: Some("Tallinn".to_string()),
        description: Some("We use Django, PostgreSQL and Docker.".to_string()),
        salary_from: Some(SalaryField::Amount(4500.0)),
        salary_to: Some(SalaryField::Amount(6000.0)),
        remote_work: Some(true),
        url: Some("https://www.cv.ee/et/vacancy/1".to_string()),
        ..RawJobRecord::default()
    }
}

pub(super) fn java_posting() -> RawJobRecord {
    RawJobRecord {
        title: Some("Java Developer".to_string()),
        company: Some("Globex".to_string()),
        location: Some("Tartu".to_string()),
        description: Some("Spring and Kotlin services.".to_string()),
        salary: Some(SalaryField::Text("From 2500 €".to_string())),
        url: Some("https://www.cvkeskus.ee/java-2".to_string()),
        ..RawJobRecord::default()
    }
}

pub(super) fn reachable_profile(skills: &str) -> UserProfile {
    let mut profile = UserProfile::new("u-1");
    profile.skills = SkillSet::parse(skills);
    profile.telegram_chat_id = Some("1001".to_string());
    profile
}

#[derive(Default)]
pub(super) struct RecordingDispatcher {
    sent: Mutex<Vec<JobNotification>>,
    offline: bool,
}

impl RecordingDispatcher {
    pub(super) fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub(super) fn sent(&self) -> Vec<JobNotification> {
        self.sent.lock().expect("dispatcher mutex poisoned").clone()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn dispatch(&self, notification: JobNotification) -> Result<(), DispatchError> {
        if self.offline {
            return Err(DispatchError::Transport("bot offline".to_string()));
        }
        self.sent
            .lock()
            .expect("dispatcher mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) fn build_pipeline() -> (MemoryPipeline, InMemoryJobStore, Arc<RecordingDispatcher>) {
    build_pipeline_with(RecordingDispatcher::default())
}

pub(super) fn build_pipeline_with(
    dispatcher: RecordingDispatcher,
) -> (MemoryPipeline, InMemoryJobStore, Arc<RecordingDispatcher>) {
    let store = InMemoryJobStore::default();
    let dispatcher = Arc::new(dispatcher);
    let pipeline = JobPipeline::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        dispatcher.clone(),
        ScoringEngine::default(),
        PipelineConfig::default(),
    );
    (pipeline, store, dispatcher)
}

pub(super) fn router_with(pipeline: MemoryPipeline) -> axum::Router {
    job_router(Arc::new(pipeline))
}

/// Store whose backend is always down.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl JobRepository for UnavailableStore {
    fn find_by_url(&self, _source_url: &str) -> Result<Option<Job>, RepositoryError> {
        offline()
    }

    fn insert(&self, _job: Job) -> Result<Job, RepositoryError> {
        offline()
    }

    fn upsert(
        &self,
        _job: Job,
        _merge: &dyn Fn(Job, &Job) -> Job,
    ) -> Result<JobUpsert, RepositoryError> {
        offline()
    }

    fn update(&self, _job: Job) -> Result<(), RepositoryError> {
        offline()
    }

    fn active(&self) -> Result<Vec<Job>, RepositoryError> {
        offline()
    }

    fn all(&self) -> Result<Vec<Job>, RepositoryError> {
        offline()
    }

    fn upsert_company(
        &self,
        _company: Company,
        _merge: &dyn Fn(Company, &Company) -> Company,
    ) -> Result<bool, RepositoryError> {
        offline()
    }
}

impl ScoreRepository for UnavailableStore {
    fn fetch(&self, _source_url: &str) -> Result<Option<JobScore>, RepositoryError> {
        offline()
    }

    fn save(&self, _score: JobScore) -> Result<(), RepositoryError> {
        offline()
    }

    fn ranked(&self) -> Result<Vec<JobScore>, RepositoryError> {
        offline()
    }

    fn purge_calculated_before(&self, _cutoff: DateTime<Utc>) -> Result<usize, RepositoryError> {
        offline()
    }
}

pub(super) fn unavailable_pipeline() -> JobPipeline<UnavailableStore, UnavailableStore, RecordingDispatcher> {
    JobPipeline::new(
        Arc::new(UnavailableStore),
        Arc::new(UnavailableStore),
        Arc::new(RecordingDispatcher::default()),
        ScoringEngine::default(),
        PipelineConfig::default(),
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

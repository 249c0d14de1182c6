use chrono::{DateTime, Utc};

use super::domain::{Company, Job, JobScore};

/// Storage abstraction for jobs and their companies, keyed by `source_url`.
pub trait JobRepository: Send + Sync {
    fn find_by_url(&self, source_url: &str) -> Result<Option<Job>, RepositoryError>;
    fn insert(&self, job: Job) -> Result<Job, RepositoryError>;
    /// Inserts `job`, or replaces the stored job at its URL with `merge(existing, &job)`.
    /// Lookup and write happen as one step.
    fn upsert(
        &self,
        job: Job,
        merge: &dyn Fn(Job, &Job) -> Job,
    ) -> Result<JobUpsert, RepositoryError>;
    fn update(&self, job: Job) -> Result<(), RepositoryError>;
    /// Active jobs in insertion order.
    fn active(&self) -> Result<Vec<Job>, RepositoryError>;
    fn all(&self) -> Result<Vec<Job>, RepositoryError>;
    /// Saves `company`, or `merge(existing, &company)` when the name is known.
    /// Returns true when a new company was created.
    fn upsert_company(
        &self,
        company: Company,
        merge: &dyn Fn(Company, &Company) -> Company,
    ) -> Result<bool, RepositoryError>;
}

/// Which branch an upsert took, with the stored job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpsert {
    Created(Job),
    Updated(Job),
}

/// Storage abstraction for one-to-one job scores.
pub trait ScoreRepository: Send + Sync {
    fn fetch(&self, source_url: &str) -> Result<Option<JobScore>, RepositoryError>;
    /// Replaces any existing score for the same job.
    fn save(&self, score: JobScore) -> Result<(), RepositoryError>;
    /// All scores, highest relevance first.
    fn ranked(&self) -> Result<Vec<JobScore>, RepositoryError>;
    fn purge_calculated_before(&self, cutoff: DateTime<Utc>) -> Result<usize, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

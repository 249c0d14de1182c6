//! Canonical job entities and their storage seams.

pub mod domain;
pub mod memory;
pub mod repository;

pub use domain::{Company, ExperienceLevel, Job, JobScore, SourceSite};
pub use memory::InMemoryJobStore;
pub use repository::{JobRepository, JobUpsert, RepositoryError, ScoreRepository};

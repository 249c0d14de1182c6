//! Raw scraper records into deduplicated canonical jobs.

mod normalizer;
mod salary;
mod source;

pub use normalizer::{normalize, Discard, NormalizedPosting};
pub use salary::{parse_salary_text, SalaryRange};
pub use source::{read_csv, read_json, RawJobRecord, SalaryField, SourceError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::workflows::jobs::{Company, Job, JobRepository, JobUpsert, RepositoryError};

/// What happened to a single raw record.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Created(Job),
    Updated(Job),
    Discarded(Discard),
}

/// Counters for one ingest batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub received: usize,
    pub created: usize,
    pub updated: usize,
    pub discarded: usize,
    pub companies_created: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Normalizes raw records and upserts them by `source_url`.
pub struct JobIngestService<R> {
    repository: Arc<R>,
}

impl<R> JobIngestService<R>
where
    R: JobRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn ingest(
        &self,
        records: &[RawJobRecord],
        now: DateTime<Utc>,
    ) -> Result<IngestReport, IngestError> {
        let mut report = IngestReport {
            received: records.len(),
            ..IngestReport::default()
        };

        for record in records {
            let (outcome, company_created) = self.ingest_record(record, now)?;
            match outcome {
                IngestOutcome::Created(_) => report.created += 1,
                IngestOutcome::Updated(_) => report.updated += 1,
                IngestOutcome::Discarded(_) => report.discarded += 1,
            }
            if company_created {
                report.companies_created += 1;
            }
        }

        info!(
            received = report.received,
            created = report.created,
            updated = report.updated,
            discarded = report.discarded,
            "job ingest finished"
        );
        Ok(report)
    }

    pub fn ingest_one(
        &self,
        record: &RawJobRecord,
        now: DateTime<Utc>,
    ) -> Result<IngestOutcome, IngestError> {
        self.ingest_record(record, now).map(|(outcome, _)| outcome)
    }

    fn ingest_record(
        &self,
        record: &RawJobRecord,
        now: DateTime<Utc>,
    ) -> Result<(IngestOutcome, bool), IngestError> {
        let posting = match normalize(record, now) {
            Ok(posting) => posting,
            Err(reason) => {
                warn!(url = ?record.url, %reason, "raw job record discarded");
                return Ok((IngestOutcome::Discarded(reason), false));
            }
        };

        let NormalizedPosting {
            job,
            employer_id,
            remote_reported,
        } = posting;
        let merge =
            |existing: Job, newer: &Job| merge_posting(existing, newer, remote_reported, now);
        let outcome = match self.repository.upsert(job, &merge)? {
            JobUpsert::Updated(merged) => {
                debug!(source_url = %merged.source_url, "job re-observed");
                IngestOutcome::Updated(merged)
            }
            JobUpsert::Created(stored) => {
                debug!(source_url = %stored.source_url, "job created");
                IngestOutcome::Created(stored)
            }
        };

        let company_created = match &outcome {
            IngestOutcome::Created(job) => self.upsert_company(job, employer_id, true, now)?,
            IngestOutcome::Updated(job) => self.upsert_company(job, employer_id, false, now)?,
            IngestOutcome::Discarded(_) => false,
        };

        Ok((outcome, company_created))
    }

    /// Upserts the company by exact name. Returns true when a new company was created.
    fn upsert_company(
        &self,
        job: &Job,
        employer_id: Option<String>,
        new_job: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        if job.company_name.is_empty() {
            return Ok(false);
        }

        let company = Company {
            name: job.company_name.clone(),
            employer_id,
            job_count: 1,
            created_at: now,
            updated_at: now,
        };
        let merge = |mut existing: Company, seen: &Company| {
            if new_job {
                existing.job_count += 1;
            }
            if seen.employer_id.is_some() {
                existing.employer_id = seen.employer_id.clone();
            }
            existing.updated_at = seen.updated_at;
            existing
        };
        self.repository.upsert_company(company, &merge)
    }
}

/// The newer observation wins for every field it actually carries. The salary
/// bounds move as one pair so a partial re-observation cannot invert them.
fn merge_posting(
    existing: Job,
    newer: &Job,
    remote_reported: Option<bool>,
    now: DateTime<Utc>,
) -> Job {
    fn text_or(newer: &str, existing: String) -> String {
        if newer.is_empty() {
            existing
        } else {
            newer.to_string()
        }
    }

    let salary = if newer.salary_min.is_some() || newer.salary_max.is_some() {
        SalaryRange::new(newer.salary_min, newer.salary_max)
    } else {
        SalaryRange::new(existing.salary_min, existing.salary_max)
    };
    let salary = if salary.is_inverted() {
        warn!(
            source_url = %existing.source_url,
            min = ?salary.min,
            max = ?salary.max,
            "inverted salary range swapped on merge"
        );
        salary.ordered()
    } else {
        salary
    };

    Job {
        title: newer.title.clone(),
        company_name: text_or(&newer.company_name, existing.company_name),
        location: text_or(&newer.location, existing.location),
        description: text_or(&newer.description, existing.description),
        requirements: text_or(&newer.requirements, existing.requirements),
        source_url: existing.source_url,
        source_site: newer.source_site,
        salary_min: salary.min,
        salary_max: salary.max,
        salary_currency: newer.salary_currency.clone(),
        is_remote: remote_reported.unwrap_or(existing.is_remote),
        experience_level: newer.experience_level,
        employment_type: newer.employment_type.clone().or(existing.employment_type),
        posted_date: newer.posted_date.or(existing.posted_date),
        created_at: existing.created_at,
        updated_at: now,
        is_active: true,
    }
}

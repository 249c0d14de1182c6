use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{Company, Job, JobScore};
use super::repository::{JobRepository, JobUpsert, RepositoryError, ScoreRepository};

#[derive(Default)]
struct JobTables {
    jobs: Vec<Job>,
    positions: HashMap<String, usize>,
    companies: HashMap<String, Company>,
    scores: HashMap<String, JobScore>,
}

/// Process-local store backing both repositories, used by the service binary and tests.
#[derive(Default, Clone)]
pub struct InMemoryJobStore {
    tables: Arc<Mutex<JobTables>>,
}

impl InMemoryJobStore {
    fn lock(&self) -> Result<MutexGuard<'_, JobTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("job store mutex poisoned".to_string()))
    }

    pub fn job_count(&self) -> usize {
        self.lock().map(|tables| tables.jobs.len()).unwrap_or(0)
    }

    pub fn companies(&self) -> Vec<Company> {
        let mut companies: Vec<Company> = self
            .lock()
            .map(|tables| tables.companies.values().cloned().collect())
            .unwrap_or_default();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        companies
    }
}

impl JobRepository for InMemoryJobStore {
    fn find_by_url(&self, source_url: &str) -> Result<Option<Job>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .positions
            .get(source_url)
            .map(|&index| tables.jobs[index].clone()))
    }

    fn insert(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.positions.contains_key(&job.source_url) {
            return Err(RepositoryError::Conflict);
        }
        let index = tables.jobs.len();
        tables.positions.insert(job.source_url.clone(), index);
        tables.jobs.push(job.clone());
        Ok(job)
    }

    fn upsert(
        &self,
        job: Job,
        merge: &dyn Fn(Job, &Job) -> Job,
    ) -> Result<JobUpsert, RepositoryError> {
        let mut tables = self.lock()?;
        match tables.positions.get(&job.source_url).copied() {
            Some(index) => {
                let merged = merge(tables.jobs[index].clone(), &job);
                tables.jobs[index] = merged.clone();
                Ok(JobUpsert::Updated(merged))
            }
            None => {
                let index = tables.jobs.len();
                tables.positions.insert(job.source_url.clone(), index);
                tables.jobs.push(job.clone());
                Ok(JobUpsert::Created(job))
            }
        }
    }

    fn update(&self, job: Job) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let index = *tables
            .positions
            .get(&job.source_url)
            .ok_or(RepositoryError::NotFound)?;
        tables.jobs[index] = job;
        Ok(())
    }

    fn active(&self) -> Result<Vec<Job>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.jobs.iter().filter(|job| job.is_active).cloned().collect())
    }

    fn all(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self.lock()?.jobs.clone())
    }

    fn upsert_company(
        &self,
        company: Company,
        merge: &dyn Fn(Company, &Company) -> Company,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        match tables.companies.remove(&company.name) {
            Some(existing) => {
                let merged = merge(existing, &company);
                tables.companies.insert(merged.name.clone(), merged);
                Ok(false)
            }
            None => {
                tables.companies.insert(company.name.clone(), company);
                Ok(true)
            }
        }
    }
}

impl ScoreRepository for InMemoryJobStore {
    fn fetch(&self, source_url: &str) -> Result<Option<JobScore>, RepositoryError> {
        Ok(self.lock()?.scores.get(source_url).cloned())
    }

    fn save(&self, score: JobScore) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        tables.scores.insert(score.source_url.clone(), score);
        Ok(())
    }

    fn ranked(&self) -> Result<Vec<JobScore>, RepositoryError> {
        let tables = self.lock()?;
        let mut scores: Vec<JobScore> = tables.scores.values().cloned().collect();
        scores.sort_by(|a, b| {
            b.relevance_score
                .cmp(&a.relevance_score)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
                .then_with(|| a.source_url.cmp(&b.source_url))
        });
        Ok(scores)
    }

    fn purge_calculated_before(&self, cutoff: DateTime<Utc>) -> Result<usize, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.scores.len();
        tables.scores.retain(|_, score| score.calculated_at >= cutoff);
        Ok(before - tables.scores.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::jobs::{ExperienceLevel, SourceSite};
    use chrono::{Duration, TimeZone};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 24, 10, 0, 0).unwrap()
    }

    fn job(url: &str) -> Job {
        Job {
            title: "Developer".to_string(),
            company_name: String::new(),
            location: String::new(),
            description: String::new(),
            requirements: String::new(),
            source_url: url.to_string(),
            source_site: SourceSite::Other,
            salary_min: None,
            salary_max: None,
            salary_currency: "EUR".to_string(),
            is_remote: false,
            experience_level: ExperienceLevel::Any,
            employment_type: None,
            posted_date: None,
            created_at: at(),
            updated_at: at(),
            is_active: true,
        }
    }

    fn score(url: &str, relevance: u8, calculated_at: DateTime<Utc>) -> JobScore {
        JobScore {
            source_url: url.to_string(),
            relevance_score: relevance,
            skill_match_score: 30,
            salary_score: 50,
            location_score: 60,
            calculated_at,
            updated_at: calculated_at,
        }
    }

    #[test]
    fn insert_rejects_duplicate_urls_and_update_requires_presence() {
        let store = InMemoryJobStore::default();
        store.insert(job("a")).expect("first insert");

        match store.insert(job("a")) {
            Err(RepositoryError::Conflict) => {}
            other => panic!("expected conflict, got {other:?}"),
        }
        match store.update(job("b")) {
            Err(RepositoryError::NotFound) => {}
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn concurrent_upserts_of_one_url_create_it_once() {
        let store = InMemoryJobStore::default();
        let keep_existing = |existing: Job, _: &Job| existing;

        let outcomes: Vec<JobUpsert> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| store.upsert(job("a"), &keep_existing)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("thread joins").expect("upsert"))
                .collect()
        });

        let created = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, JobUpsert::Created(_)))
            .count();
        assert_eq!(created, 1);
        assert_eq!(store.job_count(), 1);
    }

    #[test]
    fn company_upsert_merges_known_names() {
        let store = InMemoryJobStore::default();
        let company = Company {
            name: "Acme".to_string(),
            employer_id: None,
            job_count: 1,
            created_at: at(),
            updated_at: at(),
        };
        let bump = |mut existing: Company, _: &Company| {
            existing.job_count += 1;
            existing
        };

        assert!(store.upsert_company(company.clone(), &bump).expect("create"));
        assert!(!store.upsert_company(company, &bump).expect("merge"));
        assert_eq!(store.companies()[0].job_count, 2);
    }

    #[test]
    fn active_jobs_keep_insertion_order() {
        let store = InMemoryJobStore::default();
        for url in ["c", "a", "b"] {
            store.insert(job(url)).expect("insert");
        }
        let mut inactive = job("a");
        inactive.is_active = false;
        store.update(inactive).expect("update");

        let urls: Vec<String> = store
            .active()
            .expect("active")
            .into_iter()
            .map(|job| job.source_url)
            .collect();
        assert_eq!(urls, ["c", "b"]);
        assert_eq!(store.all().expect("all").len(), 3);
    }

    #[test]
    fn scores_are_overwritten_ranked_and_purged() {
        let store = InMemoryJobStore::default();
        store.save(score("a", 40, at())).expect("save");
        store.save(score("a", 70, at())).expect("overwrite");
        store
            .save(score("b", 55, at() - Duration::days(100)))
            .expect("save");

        let ranked = store.ranked().expect("ranked");
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].source_url, "a");
        assert_eq!(ranked[0].relevance_score, 70);

        let purged = store
            .purge_calculated_before(at() - Duration::days(90))
            .expect("purge");
        assert_eq!(purged, 1);
        assert!(store.fetch("b").expect("fetch").is_none());
        assert!(store.fetch("a").expect("fetch").is_some());
    }
}

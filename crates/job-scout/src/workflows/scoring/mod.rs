//! Relevance scoring for canonical jobs.
//!
//! Each sub-score is computed independently as a `Result`; failures collapse to
//! the configured neutral value only when the [`JobScore`] is assembled, so one
//! bad posting never stops a batch.

mod config;
mod keywords;
mod rules;

pub use config::{
    FallbackScores, LocationPriority, RelevanceWeights, SalaryBand, SalaryBands, ScoringConfig,
};
pub use keywords::{KeywordGroup, KeywordHits, KeywordTable};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::workflows::jobs::{Job, JobScore};

/// Reason a single sub-score could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("relevance weights sum to zero")]
    InvalidWeights,
    #[error("keyword table has no terms")]
    EmptyKeywordTable,
    #[error("declared salary {0} is negative")]
    NegativeSalary(i64),
    #[error("salary band {min}-{max} is not a positive ascending range")]
    InvalidSalaryBand { min: i64, max: i64 },
    #[error("location priority with an empty keyword")]
    EmptyLocationKeyword,
}

/// Raw sub-score results before fallbacks are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub relevance: Result<u8, ScoreError>,
    pub skill_match: Result<u8, ScoreError>,
    pub salary: Result<u8, ScoreError>,
    pub location: Result<u8, ScoreError>,
}

impl ScoreBreakdown {
    pub fn has_failures(&self) -> bool {
        self.relevance.is_err()
            || self.skill_match.is_err()
            || self.salary.is_err()
            || self.location.is_err()
    }

    /// Collapses failures into the neutral fallbacks, logging each one.
    pub fn settle(
        self,
        source_url: &str,
        fallback: &FallbackScores,
        now: DateTime<Utc>,
    ) -> JobScore {
        JobScore {
            source_url: source_url.to_string(),
            relevance_score: settle_one(self.relevance, "relevance", fallback.relevance, source_url),
            skill_match_score: settle_one(
                self.skill_match,
                "skill_match",
                fallback.skill_match,
                source_url,
            ),
            salary_score: settle_one(self.salary, "salary", fallback.salary, source_url),
            location_score: settle_one(self.location, "location", fallback.location, source_url),
            calculated_at: now,
            updated_at: now,
        }
    }
}

fn settle_one(
    result: Result<u8, ScoreError>,
    component: &'static str,
    fallback: u8,
    source_url: &str,
) -> u8 {
    match result {
        Ok(score) => score.min(100),
        Err(error) => {
            warn!(%source_url, component, %error, fallback, "sub-score fell back to neutral value");
            fallback.min(100)
        }
    }
}

/// Stateless scorer applying the rubric configuration and keyword tables to a job.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
    keywords: KeywordTable,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self::with_keywords(config, KeywordTable::standard())
    }

    pub fn with_keywords(config: ScoringConfig, keywords: KeywordTable) -> Self {
        Self { config, keywords }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn breakdown(&self, job: &Job, now: DateTime<Utc>) -> ScoreBreakdown {
        ScoreBreakdown {
            relevance: self.calculate_relevance_score(job, now),
            skill_match: self.calculate_skill_match_score(job),
            salary: self.calculate_salary_score(job),
            location: self.calculate_location_score(job),
        }
    }

    pub fn score(&self, job: &Job, now: DateTime<Utc>) -> JobScore {
        self.breakdown(job, now)
            .settle(&job.source_url, &self.config.fallback, now)
    }

    /// Scores jobs in order; failures never abort the batch.
    pub fn score_batch(&self, jobs: &[Job], now: DateTime<Utc>) -> Vec<JobScore> {
        let mut degraded = 0usize;
        let scores: Vec<JobScore> = jobs
            .iter()
            .map(|job| {
                let breakdown = self.breakdown(job, now);
                if breakdown.has_failures() {
                    degraded += 1;
                }
                breakdown.settle(&job.source_url, &self.config.fallback, now)
            })
            .collect();

        info!(jobs = jobs.len(), degraded, "scoring batch finished");
        scores
    }

    pub fn calculate_relevance_score(
        &self,
        job: &Job,
        now: DateTime<Utc>,
    ) -> Result<u8, ScoreError> {
        rules::relevance(job, now, &self.keywords, &self.config)
    }

    pub fn calculate_skill_match_score(&self, job: &Job) -> Result<u8, ScoreError> {
        rules::skill_match(job, &self.keywords, &self.config)
    }

    pub fn calculate_salary_score(&self, job: &Job) -> Result<u8, ScoreError> {
        rules::salary(job, &self.config)
    }

    pub fn calculate_location_score(&self, job: &Job) -> Result<u8, ScoreError> {
        rules::location(job, &self.config)
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

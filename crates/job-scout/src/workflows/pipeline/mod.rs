//! Ingest, score, match and notify over the job repositories, plus the
//! maintenance sweep that retires stale postings and expired scores.

pub mod router;

#[cfg(test)]
mod tests;

pub use router::job_router;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::workflows::ingest::{IngestError, IngestReport, JobIngestService, RawJobRecord};
use crate::workflows::jobs::{Job, JobRepository, JobScore, RepositoryError, ScoreRepository};
use crate::workflows::matching::{PreferenceFilter, UserProfile};
use crate::workflows::notifications::{DigestEntry, JobNotification, NotificationDispatcher};
use crate::workflows::scoring::ScoringEngine;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Counters for one scoring pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoringReport {
    pub active: usize,
    pub scored: usize,
    pub fresh: usize,
}

/// An active job accepted by a user's preferences, with its score if one exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredJob {
    pub job: Job,
    pub score: Option<JobScore>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotificationReport {
    pub profiles: usize,
    /// Users without notifications enabled or without a chat id.
    pub skipped: usize,
    /// Users whose preferences matched nothing.
    pub empty: usize,
    pub dispatched: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    pub deactivated: usize,
    pub scores_purged: usize,
}

/// Composes ingest, scoring, matching and notification over shared repositories.
pub struct JobPipeline<R, S, D> {
    jobs: Arc<R>,
    scores: Arc<S>,
    dispatcher: Arc<D>,
    ingest: JobIngestService<R>,
    engine: ScoringEngine,
    settings: PipelineConfig,
}

impl<R, S, D> JobPipeline<R, S, D>
where
    R: JobRepository + 'static,
    S: ScoreRepository + 'static,
    D: NotificationDispatcher + 'static,
{
    pub fn new(
        jobs: Arc<R>,
        scores: Arc<S>,
        dispatcher: Arc<D>,
        engine: ScoringEngine,
        settings: PipelineConfig,
    ) -> Self {
        Self {
            ingest: JobIngestService::new(jobs.clone()),
            jobs,
            scores,
            dispatcher,
            engine,
            settings,
        }
    }

    pub fn settings(&self) -> PipelineConfig {
        self.settings
    }

    pub fn ingest(
        &self,
        records: &[RawJobRecord],
        now: DateTime<Utc>,
    ) -> Result<IngestReport, PipelineError> {
        Ok(self.ingest.ingest(records, now)?)
    }

    /// Scores every active job whose score is missing or older than the freshness window.
    pub fn score_stale(&self, now: DateTime<Utc>) -> Result<ScoringReport, PipelineError> {
        let active = self.jobs.active()?;
        let window = self.settings.score_freshness();
        let mut report = ScoringReport {
            active: active.len(),
            ..ScoringReport::default()
        };

        let mut pending = Vec::new();
        for job in active {
            match self.scores.fetch(&job.source_url)? {
                Some(existing) if existing.is_fresh(now, window) => report.fresh += 1,
                _ => pending.push(job),
            }
        }

        for score in self.engine.score_batch(&pending, now) {
            self.scores.save(score)?;
            report.scored += 1;
        }

        info!(
            active = report.active,
            scored = report.scored,
            fresh = report.fresh,
            "scoring pass finished"
        );
        Ok(report)
    }

    /// All stored scores, highest relevance first.
    pub fn scores(&self) -> Result<Vec<JobScore>, PipelineError> {
        Ok(self.scores.ranked()?)
    }

    /// Active jobs accepted by the profile, in insertion order.
    pub fn matches_for(&self, profile: &UserProfile) -> Result<Vec<ScoredJob>, PipelineError> {
        let active = self.jobs.active()?;
        PreferenceFilter::filter_jobs(&active, profile)
            .into_iter()
            .map(|job| {
                let score = self.scores.fetch(&job.source_url)?;
                Ok(ScoredJob { job, score })
            })
            .collect()
    }

    /// Sends each opted-in user a digest of their current matches.
    pub fn notify(&self, profiles: &[UserProfile]) -> Result<NotificationReport, PipelineError> {
        let mut report = NotificationReport {
            profiles: profiles.len(),
            ..NotificationReport::default()
        };

        for profile in profiles {
            let Some(chat_id) = profile.notification_target() else {
                debug!(user_id = %profile.user_id, "user not reachable, digest skipped");
                report.skipped += 1;
                continue;
            };

            let matches = self.matches_for(profile)?;
            if matches.is_empty() {
                report.empty += 1;
                continue;
            }

            let notification = JobNotification::Digest {
                user_id: profile.user_id.clone(),
                chat_id: chat_id.to_string(),
                jobs: matches
                    .iter()
                    .map(|matched| DigestEntry::new(&matched.job, matched.score.as_ref()))
                    .collect(),
            };

            match self.dispatcher.dispatch(notification) {
                Ok(()) => report.dispatched += 1,
                Err(error) => {
                    warn!(user_id = %profile.user_id, %error, "job digest dispatch failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            profiles = report.profiles,
            dispatched = report.dispatched,
            skipped = report.skipped,
            failed = report.failed,
            "job digests processed"
        );
        Ok(report)
    }

    /// Deactivates jobs unseen past the stale window and purges expired scores.
    pub fn run_maintenance(&self, now: DateTime<Utc>) -> Result<MaintenanceReport, PipelineError> {
        let stale_after = self.settings.stale_after();
        let mut report = MaintenanceReport::default();

        for mut job in self.jobs.active()? {
            if job.is_stale(now, stale_after) {
                debug!(source_url = %job.source_url, "deactivating stale job");
                job.is_active = false;
                self.jobs.update(job)?;
                report.deactivated += 1;
            }
        }

        let cutoff = now - self.settings.score_retention();
        report.scores_purged = self.scores.purge_calculated_before(cutoff)?;

        info!(
            deactivated = report.deactivated,
            scores_purged = report.scores_purged,
            "maintenance finished"
        );
        Ok(report)
    }
}

//! Outbound notification contract. Transports live outside this crate.

use chrono::NaiveDate;
use serde::Serialize;

use crate::workflows::jobs::{Job, JobScore};
use crate::workflows::matching::UserId;

/// One matched job inside a digest, in match order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestEntry {
    pub source_url: String,
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub relevance_score: Option<u8>,
}

impl DigestEntry {
    pub fn new(job: &Job, score: Option<&JobScore>) -> Self {
        Self {
            source_url: job.source_url.clone(),
            title: job.title.clone(),
            company_name: job.company_name.clone(),
            location: job.location.clone(),
            relevance_score: score.map(|score| score.relevance_score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobNotification {
    Digest {
        user_id: UserId,
        chat_id: String,
        jobs: Vec<DigestEntry>,
    },
    ApplicationReminder {
        user_id: UserId,
        source_url: String,
        job_title: String,
        reminder_date: NaiveDate,
    },
}

impl JobNotification {
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::Digest { user_id, .. } | Self::ApplicationReminder { user_id, .. } => user_id,
        }
    }

    /// Short human-readable line used in logs and plain-text transports.
    pub fn summary(&self) -> String {
        match self {
            Self::Digest { jobs, .. } => match jobs.len() {
                1 => "1 matching job".to_string(),
                count => format!("{count} matching jobs"),
            },
            Self::ApplicationReminder {
                job_title,
                reminder_date,
                ..
            } => format!("reminder for {job_title} due {reminder_date}"),
        }
    }
}

/// Delivers notifications to users.
pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(&self, notification: JobNotification) -> Result<(), DispatchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification has no recipient")]
    MissingRecipient,
}

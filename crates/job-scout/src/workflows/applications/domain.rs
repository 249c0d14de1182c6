use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::matching::UserId;

/// Where a user stands with one job. Transitions are unordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Interested,
    Applied,
    Interview,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Interested => "interested",
            Self::Applied => "applied",
            Self::Interview => "interview",
            Self::Rejected => "rejected",
            Self::Accepted => "accepted",
        }
    }
}

/// A user's pursuit of a job, unique per (user, job).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub user_id: UserId,
    pub source_url: String,
    pub job_title: String,
    pub status: ApplicationStatus,
    pub applied_at: Option<DateTime<Utc>>,
    pub notes: String,
    pub reminder_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn new(
        user_id: UserId,
        source_url: impl Into<String>,
        job_title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            source_url: source_url.into(),
            job_title: job_title.into(),
            status: ApplicationStatus::Interested,
            applied_at: None,
            notes: String::new(),
            reminder_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves to `status`; the first move to `Applied` stamps `applied_at`.
    pub fn transition(&mut self, status: ApplicationStatus, now: DateTime<Utc>) {
        if status == ApplicationStatus::Applied && self.applied_at.is_none() {
            self.applied_at = Some(now);
        }
        self.status = status;
        self.updated_at = now;
    }

    pub fn reminder_due(&self, today: NaiveDate) -> bool {
        self.reminder_date.is_some_and(|date| date <= today)
    }
}

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{Application, ApplicationStatus};
use super::repository::ApplicationRepository;
use crate::workflows::jobs::RepositoryError;
use crate::workflows::matching::UserId;
use crate::workflows::notifications::{JobNotification, NotificationDispatcher};

#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("application for {source_url} is already tracked")]
    AlreadyTracked { source_url: String },
    #[error("no application for {source_url}")]
    NotTracked { source_url: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Counters for one reminder sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderReport {
    pub due: usize,
    pub dispatched: usize,
    pub failed: usize,
}

/// Records a user's pursuit of jobs and sends their reminders.
pub struct ApplicationTracker<R> {
    repository: Arc<R>,
}

impl<R> ApplicationTracker<R>
where
    R: ApplicationRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn track(
        &self,
        user_id: UserId,
        source_url: &str,
        job_title: &str,
        now: DateTime<Utc>,
    ) -> Result<Application, ApplicationError> {
        let application = Application::new(user_id, source_url, job_title, now);
        match self.repository.insert(application) {
            Ok(stored) => Ok(stored),
            Err(RepositoryError::Conflict) => Err(ApplicationError::AlreadyTracked {
                source_url: source_url.to_string(),
            }),
            Err(other) => Err(other.into()),
        }
    }

    pub fn update_status(
        &self,
        user_id: &UserId,
        source_url: &str,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<Application, ApplicationError> {
        self.modify(user_id, source_url, |application| {
            application.transition(status, now)
        })
    }

    pub fn set_reminder(
        &self,
        user_id: &UserId,
        source_url: &str,
        reminder_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<Application, ApplicationError> {
        self.modify(user_id, source_url, |application| {
            application.reminder_date = reminder_date;
            application.updated_at = now;
        })
    }

    pub fn annotate(
        &self,
        user_id: &UserId,
        source_url: &str,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Application, ApplicationError> {
        self.modify(user_id, source_url, |application| {
            application.notes = notes.trim().to_string();
            application.updated_at = now;
        })
    }

    pub fn get(&self, user_id: &UserId, source_url: &str) -> Result<Application, ApplicationError> {
        self.repository
            .fetch(user_id, source_url)?
            .ok_or_else(|| ApplicationError::NotTracked {
                source_url: source_url.to_string(),
            })
    }

    pub fn for_user(&self, user_id: &UserId) -> Result<Vec<Application>, ApplicationError> {
        Ok(self.repository.for_user(user_id)?)
    }

    /// Sends every due reminder; a reminder is cleared only after a successful dispatch.
    pub fn dispatch_due_reminders<D>(
        &self,
        today: NaiveDate,
        dispatcher: &D,
        now: DateTime<Utc>,
    ) -> Result<ReminderReport, ApplicationError>
    where
        D: NotificationDispatcher + ?Sized,
    {
        let due = self.repository.with_reminder_due(today)?;
        let mut report = ReminderReport {
            due: due.len(),
            ..ReminderReport::default()
        };

        for mut application in due {
            let Some(reminder_date) = application.reminder_date else {
                continue;
            };
            let notification = JobNotification::ApplicationReminder {
                user_id: application.user_id.clone(),
                source_url: application.source_url.clone(),
                job_title: application.job_title.clone(),
                reminder_date,
            };

            match dispatcher.dispatch(notification) {
                Ok(()) => {
                    application.reminder_date = None;
                    application.updated_at = now;
                    self.repository.update(application)?;
                    report.dispatched += 1;
                }
                Err(error) => {
                    warn!(
                        user_id = %application.user_id,
                        source_url = %application.source_url,
                        %error,
                        "application reminder dispatch failed"
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            due = report.due,
            dispatched = report.dispatched,
            failed = report.failed,
            "application reminders processed"
        );
        Ok(report)
    }

    fn modify<F>(
        &self,
        user_id: &UserId,
        source_url: &str,
        change: F,
    ) -> Result<Application, ApplicationError>
    where
        F: FnOnce(&mut Application),
    {
        let mut application = self.get(user_id, source_url)?;
        change(&mut application);
        self.repository.update(application.clone())?;
        Ok(application)
    }
}

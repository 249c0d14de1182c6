use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

use super::domain::Application;
use crate::workflows::jobs::RepositoryError;
use crate::workflows::matching::UserId;

/// Storage abstraction for applications keyed by (user, job URL).
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn update(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch(
        &self,
        user_id: &UserId,
        source_url: &str,
    ) -> Result<Option<Application>, RepositoryError>;
    fn for_user(&self, user_id: &UserId) -> Result<Vec<Application>, RepositoryError>;
    /// Applications whose reminder date is on or before `today`.
    fn with_reminder_due(&self, today: NaiveDate) -> Result<Vec<Application>, RepositoryError>;
}

type ApplicationKey = (UserId, String);

#[derive(Default, Clone)]
pub struct InMemoryApplicationStore {
    records: Arc<Mutex<BTreeMap<ApplicationKey, Application>>>,
}

impl InMemoryApplicationStore {
    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, BTreeMap<ApplicationKey, Application>>, RepositoryError> {
        self.records.lock().map_err(|_| {
            RepositoryError::Unavailable("application store mutex poisoned".to_string())
        })
    }

    fn key(application: &Application) -> ApplicationKey {
        (
            application.user_id.clone(),
            application.source_url.clone(),
        )
    }
}

impl ApplicationRepository for InMemoryApplicationStore {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut records = self.lock()?;
        let key = Self::key(&application);
        if records.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(key, application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut records = self.lock()?;
        match records.get_mut(&Self::key(&application)) {
            Some(existing) => {
                *existing = application;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(
        &self,
        user_id: &UserId,
        source_url: &str,
    ) -> Result<Option<Application>, RepositoryError> {
        let records = self.lock()?;
        Ok(records
            .get(&(user_id.clone(), source_url.to_string()))
            .cloned())
    }

    fn for_user(&self, user_id: &UserId) -> Result<Vec<Application>, RepositoryError> {
        let records = self.lock()?;
        Ok(records
            .values()
            .filter(|application| &application.user_id == user_id)
            .cloned()
            .collect())
    }

    fn with_reminder_due(&self, today: NaiveDate) -> Result<Vec<Application>, RepositoryError> {
        let records = self.lock()?;
        Ok(records
            .values()
            .filter(|application| application.reminder_due(today))
            .cloned()
            .collect())
    }
}

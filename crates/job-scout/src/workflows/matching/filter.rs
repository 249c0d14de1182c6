use tracing::{debug, warn};

use super::profile::UserProfile;
use crate::workflows::jobs::Job;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("minimum salary {0} is negative")]
    NegativeMinimumSalary(i64),
}

/// Conjunctive salary, location and skill predicates derived from one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceFilter {
    min_salary: Option<i64>,
    location: Option<String>,
    skills: Vec<String>,
}

impl PreferenceFilter {
    pub fn for_profile(profile: &UserProfile) -> Result<Self, FilterError> {
        if let Some(min_salary) = profile.min_salary {
            if min_salary < 0 {
                return Err(FilterError::NegativeMinimumSalary(min_salary));
            }
        }

        let location = profile
            .location_preference
            .as_deref()
            .map(|location| location.trim().to_lowercase())
            .filter(|location| !location.is_empty());

        Ok(Self {
            min_salary: profile.min_salary,
            location,
            skills: profile.skills.iter().map(str::to_string).collect(),
        })
    }

    /// True when no predicate is active.
    pub fn is_identity(&self) -> bool {
        self.min_salary.is_none() && self.location.is_none() && self.skills.is_empty()
    }

    pub fn accepts(&self, job: &Job) -> bool {
        self.salary_ok(job) && self.location_ok(job) && self.skills_ok(job)
    }

    /// Keeps accepted jobs in their input order.
    pub fn apply(&self, jobs: &[Job]) -> Vec<Job> {
        if self.is_identity() {
            return jobs.to_vec();
        }
        jobs.iter().filter(|job| self.accepts(job)).cloned().collect()
    }

    pub fn try_filter(jobs: &[Job], profile: &UserProfile) -> Result<Vec<Job>, FilterError> {
        let filter = Self::for_profile(profile)?;
        let accepted = filter.apply(jobs);
        debug!(
            user_id = %profile.user_id,
            received = jobs.len(),
            accepted = accepted.len(),
            "preference filter applied"
        );
        Ok(accepted)
    }

    /// Filters jobs for a profile, returning the input unchanged if the profile is unusable.
    pub fn filter_jobs(jobs: &[Job], profile: &UserProfile) -> Vec<Job> {
        match Self::try_filter(jobs, profile) {
            Ok(accepted) => accepted,
            Err(error) => {
                warn!(user_id = %profile.user_id, %error, "preference filter failed open");
                jobs.to_vec()
            }
        }
    }

    fn salary_ok(&self, job: &Job) -> bool {
        match (job.salary_min, self.min_salary) {
            (Some(offered), Some(required)) => offered >= required,
            _ => true,
        }
    }

    fn location_ok(&self, job: &Job) -> bool {
        match &self.location {
            Some(wanted) => job.is_remote || job.location.to_lowercase().contains(wanted.as_str()),
            None => true,
        }
    }

    fn skills_ok(&self, job: &Job) -> bool {
        if self.skills.is_empty() {
            return true;
        }
        let text = job.full_text();
        self.skills.iter().any(|skill| text.contains(skill.as_str()))
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Job board a posting was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSite {
    CvEe,
    Linkedin,
    Cvkeskus,
    #[default]
    Other,
}

impl SourceSite {
    /// Infers the board from the posting URL host.
    pub fn from_url(url: &str) -> Self {
        let lowered = url.trim().to_ascii_lowercase();
        let without_scheme = lowered
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&lowered);
        let host = without_scheme
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        let host = host.strip_prefix("www.").unwrap_or(host);

        if host == "cv.ee" || host.ends_with(".cv.ee") {
            Self::CvEe
        } else if host.contains("linkedin.") {
            Self::Linkedin
        } else if host.contains("cvkeskus.") {
            Self::Cvkeskus
        } else {
            Self::Other
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CvEe => "cv_ee",
            Self::Linkedin => "linkedin",
            Self::Cvkeskus => "cvkeskus",
            Self::Other => "other",
        }
    }
}

/// Seniority a posting is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Junior,
    Middle,
    Senior,
    Lead,
    #[default]
    Any,
}

impl ExperienceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Junior => "Junior",
            Self::Middle => "Middle",
            Self::Senior => "Senior",
            Self::Lead => "Lead",
            Self::Any => "Any",
        }
    }
}

/// A posting observed from one source, keyed by `source_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    pub source_url: String,
    #[serde(default)]
    pub source_site: SourceSite,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: String,
    pub is_remote: bool,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub employment_type: Option<String>,
    pub posted_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Job {
    /// Lowercased `title + description`, the text relevance keywords are searched in.
    pub fn headline_text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }

    /// Lowercased `title + description + requirements`.
    pub fn full_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.requirements).to_lowercase()
    }

    /// True once the posting has gone unobserved for longer than `after`.
    pub fn is_stale(&self, now: DateTime<Utc>, after: Duration) -> bool {
        now.signed_duration_since(self.updated_at) > after
    }
}

/// Employer record upserted by exact (case-sensitive) name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub employer_id: Option<String>,
    pub job_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-job sub-scores, each in `0..=100`. Overwritten on every recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobScore {
    pub source_url: String,
    pub relevance_score: u8,
    pub skill_match_score: u8,
    pub salary_score: u8,
    pub location_score: u8,
    pub calculated_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobScore {
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now.signed_duration_since(self.calculated_at) <= window
    }

    pub fn is_expired(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        now.signed_duration_since(self.calculated_at) > retention
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

use super::salary::{parse_salary_text, SalaryRange};
use super::source::{RawJobRecord, SalaryField};
use crate::workflows::jobs::{ExperienceLevel, Job, SourceSite};

const DEFAULT_CURRENCY: &str = "EUR";

/// Seniority keywords checked against title tokens, most senior first.
const LEVEL_KEYWORDS: &[(ExperienceLevel, &[&str])] = &[
    (ExperienceLevel::Lead, &["lead", "head", "principal", "juht"]),
    (ExperienceLevel::Senior, &["senior", "sr", "vanem"]),
    (ExperienceLevel::Middle, &["middle", "mid", "intermediate"]),
    (ExperienceLevel::Junior, &["junior", "jr", "trainee", "intern", "noorem"]),
];

/// A canonical job plus the employer details that travel with it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPosting {
    pub job: Job,
    pub employer_id: Option<String>,
    /// Remote flag as reported; `None` when the source omitted it.
    pub remote_reported: Option<bool>,
}

/// Reason a raw record could not become a job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Discard {
    #[error("record has no title")]
    MissingTitle,
}

pub(crate) fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalized_field(value: Option<&str>) -> String {
    value.map(normalize_text).unwrap_or_default()
}

/// Keeps paragraph breaks in long text but trims each line.
fn normalize_block(value: Option<&str>) -> String {
    value
        .map(|text| {
            text.lines()
                .map(normalize_text)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

pub(crate) fn infer_experience_level(title: &str) -> ExperienceLevel {
    let lowered = title.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect();

    LEVEL_KEYWORDS
        .iter()
        .find(|(_, keywords)| tokens.iter().any(|token| keywords.contains(token)))
        .map(|(level, _)| *level)
        .unwrap_or_default()
}

fn slug(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Dedup key for postings scraped without a URL.
fn synthetic_source_url(raw: &RawJobRecord, title: &str, company: &str) -> String {
    match raw.id.as_deref() {
        Some(id) => format!("urn:job-scout:record:{}", slug(id)),
        None => format!("urn:job-scout:posting:{}:{}", slug(company), slug(title)),
    }
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }

    for format in ["%Y-%m-%d", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

fn resolve_salary(raw: &RawJobRecord) -> SalaryRange {
    let from = raw.salary_from.as_ref().or(raw.salary.as_ref());
    match (from, raw.salary_to.as_ref()) {
        (None, None) => SalaryRange::default(),
        (Some(SalaryField::Text(text)), None) => parse_salary_text(text),
        (from, to) => SalaryRange::new(
            from.and_then(SalaryField::amount),
            to.and_then(SalaryField::amount),
        ),
    }
}

/// Maps a raw scraper record into a canonical job observed at `now`.
pub fn normalize(raw: &RawJobRecord, now: DateTime<Utc>) -> Result<NormalizedPosting, Discard> {
    let title = normalized_field(raw.title.as_deref());
    if title.is_empty() {
        return Err(Discard::MissingTitle);
    }

    let company_name = normalized_field(raw.company.as_deref());
    let source_url = raw
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| synthetic_source_url(raw, &title, &company_name));

    let salary = resolve_salary(raw);
    let salary = if salary.is_inverted() {
        warn!(
            %source_url,
            min = ?salary.min,
            max = ?salary.max,
            "inverted salary range swapped"
        );
        salary.ordered()
    } else {
        salary
    };

    let experience_level = infer_experience_level(&title);
    let job = Job {
        source_site: SourceSite::from_url(&source_url),
        title,
        company_name,
        location: normalized_field(raw.location.as_deref()),
        description: normalize_block(raw.description.as_deref()),
        requirements: normalize_block(raw.requirements.as_deref()),
        source_url,
        salary_min: salary.min,
        salary_max: salary.max,
        salary_currency: DEFAULT_CURRENCY.to_string(),
        is_remote: raw.remote_work.unwrap_or(false),
        experience_level,
        employment_type: raw
            .employment_type
            .as_deref()
            .map(normalize_text)
            .filter(|value| !value.is_empty()),
        posted_date: raw.publish_date.as_deref().and_then(parse_datetime),
        created_at: now,
        updated_at: now,
        is_active: true,
    };

    Ok(NormalizedPosting {
        job,
        employer_id: raw.employer_id.clone(),
        remote_reported: raw.remote_work,
    })
}

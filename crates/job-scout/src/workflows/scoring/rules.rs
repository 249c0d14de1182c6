use chrono::{DateTime, Utc};

use super::config::{ScoringConfig, SalaryBand};
use super::keywords::{experience_terms, KeywordTable};
use super::ScoreError;
use crate::workflows::jobs::{ExperienceLevel, Job};

const MAX_SCORE: u32 = 100;

/// Weighted relevance: technology coverage, experience match, freshness and completeness.
pub(crate) fn relevance(
    job: &Job,
    now: DateTime<Utc>,
    keywords: &KeywordTable,
    config: &ScoringConfig,
) -> Result<u8, ScoreError> {
    let weights = config.weights;
    let total_weight = weights.total();
    if total_weight == 0 {
        return Err(ScoreError::InvalidWeights);
    }

    let headline = job.headline_text();
    let weighted = u32::from(technology_coverage(keywords, &headline))
        * u32::from(weights.technology)
        + u32::from(experience_match(job.experience_level, &headline))
            * u32::from(weights.experience)
        + u32::from(freshness(job.created_at, now)) * u32::from(weights.freshness)
        + u32::from(completeness(job)) * u32::from(weights.completeness);

    Ok(clamp(weighted / total_weight))
}

/// 30 points per matched group plus 10 per distinct matched term.
pub(crate) fn technology_coverage(keywords: &KeywordTable, lowered: &str) -> u8 {
    let hits = keywords.hits(lowered);
    let points = hits.groups.saturating_mul(30) + hits.terms.saturating_mul(10);
    clamp(u32::try_from(points).unwrap_or(MAX_SCORE))
}

pub(crate) fn experience_match(level: ExperienceLevel, lowered: &str) -> u8 {
    match experience_terms(level) {
        Some(terms) if terms.iter().any(|term| lowered.contains(term)) => 100,
        _ => 70,
    }
}

pub(crate) fn freshness(created_at: DateTime<Utc>, now: DateTime<Utc>) -> u8 {
    let days = now.signed_duration_since(created_at).num_days().max(0);
    match days {
        0..=1 => 100,
        2..=7 => 90,
        8..=14 => 70,
        15..=30 => 50,
        _ => 30,
    }
}

pub(crate) fn completeness(job: &Job) -> u8 {
    let mut points: u32 = 0;
    if job.title.chars().count() > 10 {
        points += 20;
    }
    if job.description.chars().count() > 100 {
        points += 30;
    }
    if job.requirements.chars().count() > 50 {
        points += 20;
    }
    if job.salary_min.is_some() {
        points += 15;
    }
    if !job.company_name.is_empty() {
        points += 15;
    }
    clamp(points)
}

/// Share of all known technology terms found anywhere in the posting.
pub(crate) fn skill_match(
    job: &Job,
    keywords: &KeywordTable,
    config: &ScoringConfig,
) -> Result<u8, ScoreError> {
    let total = keywords.total_terms();
    if total == 0 {
        return Err(ScoreError::EmptyKeywordTable);
    }

    let hits = keywords.hits(&job.full_text());
    if hits.groups == 0 {
        return Ok(config.skill_match_floor.min(100));
    }

    let share = hits.terms.saturating_mul(100) / total;
    Ok(clamp(u32::try_from(share).unwrap_or(MAX_SCORE)))
}

/// Compares the declared minimum against the band for the job's seniority.
pub(crate) fn salary(job: &Job, config: &ScoringConfig) -> Result<u8, ScoreError> {
    let Some(salary_min) = job.salary_min else {
        return Ok(config.undeclared_salary_score.min(100));
    };
    if salary_min < 0 {
        return Err(ScoreError::NegativeSalary(salary_min));
    }

    let band = config.salary_bands.for_level(job.experience_level);
    let SalaryBand { min, max } = band;
    if min <= 0 || max <= min {
        return Err(ScoreError::InvalidSalaryBand { min, max });
    }

    let score = if salary_min >= max {
        100
    } else if salary_min >= min {
        50 + (salary_min - min) * 50 / (max - min)
    } else {
        salary_min * 50 / min
    };

    Ok(clamp(u32::try_from(score).unwrap_or(0)))
}

pub(crate) fn location(job: &Job, config: &ScoringConfig) -> Result<u8, ScoreError> {
    if job.is_remote {
        return Ok(config.remote_location_score.min(100));
    }

    let lowered = job.location.to_lowercase();
    for priority in &config.location_priorities {
        let keyword = priority.keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return Err(ScoreError::EmptyLocationKeyword);
        }
        if lowered.contains(&keyword) {
            return Ok(priority.score.min(100));
        }
    }

    Ok(config.default_location_score.min(100))
}

fn clamp(points: u32) -> u8 {
    points.min(MAX_SCORE) as u8
}

use serde::{Deserialize, Serialize};

use crate::workflows::jobs::ExperienceLevel;

/// Weights (percent shares) of the relevance components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceWeights {
    pub technology: u8,
    pub experience: u8,
    pub freshness: u8,
    pub completeness: u8,
}

impl RelevanceWeights {
    pub(crate) fn total(&self) -> u32 {
        u32::from(self.technology)
            + u32::from(self.experience)
            + u32::from(self.freshness)
            + u32::from(self.completeness)
    }
}

/// Expected EUR/month salary band for one seniority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBand {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBands {
    pub junior: SalaryBand,
    pub middle: SalaryBand,
    pub senior: SalaryBand,
    /// Used for levels without a band of their own.
    pub default: SalaryBand,
}

impl SalaryBands {
    pub fn for_level(&self, level: ExperienceLevel) -> SalaryBand {
        match level {
            ExperienceLevel::Junior => self.junior,
            ExperienceLevel::Middle => self.middle,
            ExperienceLevel::Senior => self.senior,
            ExperienceLevel::Lead | ExperienceLevel::Any => self.default,
        }
    }
}

/// Location keyword and the score awarded when it appears in the job location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPriority {
    pub keyword: String,
    pub score: u8,
}

impl LocationPriority {
    fn new(keyword: &str, score: u8) -> Self {
        Self {
            keyword: keyword.to_string(),
            score,
        }
    }
}

/// Neutral values substituted when a sub-score cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackScores {
    pub relevance: u8,
    pub skill_match: u8,
    pub salary: u8,
    pub location: u8,
}

/// Rubric configuration for the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: RelevanceWeights,
    pub salary_bands: SalaryBands,
    /// Checked in order; the first keyword found in the location wins.
    pub location_priorities: Vec<LocationPriority>,
    pub remote_location_score: u8,
    pub default_location_score: u8,
    /// Skill match reported when no technology group matched at all.
    pub skill_match_floor: u8,
    /// Salary score when the posting declares no minimum.
    pub undeclared_salary_score: u8,
    pub fallback: FallbackScores,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: RelevanceWeights {
                technology: 40,
                experience: 20,
                freshness: 20,
                completeness: 20,
            },
            salary_bands: SalaryBands {
                junior: SalaryBand { min: 1500, max: 3000 },
                middle: SalaryBand { min: 3000, max: 5000 },
                senior: SalaryBand { min: 5000, max: 8000 },
                default: SalaryBand { min: 2000, max: 4000 },
            },
            location_priorities: vec![
                LocationPriority::new("tallinn", 100),
                LocationPriority::new("tartu", 90),
                LocationPriority::new("estonia", 85),
                LocationPriority::new("remote", 95),
                LocationPriority::new("hybrid", 90),
            ],
            remote_location_score: 95,
            default_location_score: 60,
            skill_match_floor: 30,
            undeclared_salary_score: 50,
            fallback: FallbackScores {
                relevance: 50,
                skill_match: 30,
                salary: 50,
                location: 60,
            },
        }
    }
}

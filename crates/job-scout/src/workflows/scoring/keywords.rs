use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::workflows::jobs::ExperienceLevel;

const TECHNOLOGY_GROUPS: &[(&str, &[&str])] = &[
    (
        "python",
        &["python", "django", "flask", "fastapi", "pandas", "numpy", "pytest"],
    ),
    (
        "javascript",
        &["javascript", "typescript", "react", "vue", "angular", "node.js", "next.js"],
    ),
    ("java", &["java", "spring", "kotlin", "hibernate", "maven"]),
    ("php", &["php", "laravel", "symfony", "wordpress"]),
    ("csharp", &["c#", ".net", "asp.net", "csharp", "blazor"]),
    (
        "devops",
        &["docker", "kubernetes", "terraform", "aws", "azure", "gcp", "ci/cd", "ansible", "linux"],
    ),
    (
        "data",
        &["sql", "postgresql", "mysql", "mongodb", "redis", "spark", "kafka", "etl"],
    ),
];

const EXPERIENCE_GROUPS: &[(ExperienceLevel, &[&str])] = &[
    (
        ExperienceLevel::Junior,
        &["junior", "entry level", "trainee", "intern", "graduate"],
    ),
    (
        ExperienceLevel::Middle,
        &["middle", "mid-level", "mid level", "intermediate"],
    ),
    (
        ExperienceLevel::Senior,
        &["senior", "expert", "principal", "architect"],
    ),
];

/// Named list of terms that signal one technology stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub name: String,
    pub terms: Vec<String>,
}

/// Distinct groups and terms found in a piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordHits {
    pub groups: usize,
    pub terms: usize,
}

/// Immutable keyword data owned by the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTable {
    technology: Vec<KeywordGroup>,
}

impl KeywordTable {
    pub fn new(technology: Vec<KeywordGroup>) -> Self {
        let technology = technology
            .into_iter()
            .map(|group| KeywordGroup {
                name: group.name,
                terms: group
                    .terms
                    .into_iter()
                    .map(|term| term.trim().to_lowercase())
                    .filter(|term| !term.is_empty())
                    .collect(),
            })
            .collect();
        Self { technology }
    }

    pub fn standard() -> Self {
        Self::new(
            TECHNOLOGY_GROUPS
                .iter()
                .map(|(name, terms)| KeywordGroup {
                    name: (*name).to_string(),
                    terms: terms.iter().map(|term| (*term).to_string()).collect(),
                })
                .collect(),
        )
    }

    pub fn groups(&self) -> &[KeywordGroup] {
        &self.technology
    }

    /// Number of distinct terms across every technology group.
    pub fn total_terms(&self) -> usize {
        self.technology
            .iter()
            .flat_map(|group| group.terms.iter())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Counts hits in already-lowercased text.
    ///
    /// Terms match as plain substrings, so "javascript" also hits `java` and
    /// "revenue" hits `vue`. Keep that in mind when adding short terms.
    pub fn hits(&self, lowered: &str) -> KeywordHits {
        let mut matched_terms = BTreeSet::new();
        let mut groups = 0;

        for group in &self.technology {
            let mut group_hit = false;
            for term in &group.terms {
                if lowered.contains(term.as_str()) {
                    matched_terms.insert(term.as_str());
                    group_hit = true;
                }
            }
            if group_hit {
                groups += 1;
            }
        }

        KeywordHits {
            groups,
            terms: matched_terms.len(),
        }
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Seniority phrases for a declared level, if the level has any.
pub(crate) fn experience_terms(level: ExperienceLevel) -> Option<&'static [&'static str]> {
    EXPERIENCE_GROUPS
        .iter()
        .find(|(candidate, _)| *candidate == level)
        .map(|(_, terms)| *terms)
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier wrapper for the user a profile belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercased, deduplicated skills. Travels as a comma-separated string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SkillSet(BTreeSet<String>);

impl SkillSet {
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(|skill| skill.trim().to_lowercase())
                .filter(|skill| !skill.is_empty())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(skill)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<String> for SkillSet {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<SkillSet> for String {
    fn from(skills: SkillSet) -> Self {
        skills.0.into_iter().collect::<Vec<_>>().join(",")
    }
}

fn notifications_default() -> bool {
    true
}

/// Snapshot of a user's job preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    #[serde(default)]
    pub skills: SkillSet,
    #[serde(default)]
    pub min_salary: Option<i64>,
    #[serde(default)]
    pub location_preference: Option<String>,
    #[serde(default = "notifications_default")]
    pub is_notifications_enabled: bool,
    #[serde(default)]
    pub telegram_chat_id: Option<String>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            skills: SkillSet::default(),
            min_salary: None,
            location_preference: None,
            is_notifications_enabled: true,
            telegram_chat_id: None,
        }
    }

    /// Chat id to deliver to, if the user wants notifications at all.
    pub fn notification_target(&self) -> Option<&str> {
        if !self.is_notifications_enabled {
            return None;
        }
        self.telegram_chat_id
            .as_deref()
            .map(str::trim)
            .filter(|chat_id| !chat_id.is_empty())
    }
}

//! Per-user preference filtering over canonical jobs.

mod filter;
mod profile;

pub use filter::{FilterError, PreferenceFilter};
pub use profile::{SkillSet, UserId, UserProfile};

//! Job posting aggregation core: normalization of scraped records, relevance
//! scoring, preference matching, and application tracking.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

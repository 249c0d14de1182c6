pub mod applications;
pub mod ingest;
pub mod jobs;
pub mod matching;
pub mod notifications;
pub mod pipeline;
pub mod scoring;

use chrono::Utc;
use clap::{Args, ValueEnum};
use job_scout::config::AppConfig;
use job_scout::error::AppError;
use job_scout::telemetry;
use job_scout::workflows::ingest::{read_csv, read_json, RawJobRecord, SourceError};
use job_scout::workflows::matching::UserProfile;
use job_scout::workflows::pipeline::ScoredJob;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::infra::{build_pipeline, ServicePipeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Scraper export to score (JSON array or CSV with raw record headers)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Input format; inferred from the file extension when omitted
    #[arg(long, value_enum)]
    pub(crate) format: Option<InputFormat>,
    /// User profile JSON used to filter the scored jobs
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,
    /// Print machine-readable JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let format = args.format.unwrap_or_else(|| InputFormat::detect(&args.input));
    let records = load_records(&args.input, format)?;
    let profile = args.profile.as_deref().map(load_profile).transpose()?;

    let pipeline = build_pipeline(config.pipeline);
    let ranked = score_records(&pipeline, &records, profile.as_ref())?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&ranked).map_err(SourceError::from)?;
        println!("{rendered}");
        return Ok(());
    }

    println!(
        "Scored {} of {} records from {}",
        ranked.len(),
        records.len(),
        args.input.display()
    );
    for scored in &ranked {
        render_scored_job(scored);
    }
    Ok(())
}

fn load_records(path: &Path, format: InputFormat) -> Result<Vec<RawJobRecord>, AppError> {
    let reader = BufReader::new(File::open(path)?);
    let records = match format {
        InputFormat::Json => read_json(reader)?,
        InputFormat::Csv => read_csv(reader)?,
    };
    Ok(records)
}

fn load_profile(path: &Path) -> Result<UserProfile, AppError> {
    let reader = BufReader::new(File::open(path)?);
    let profile: UserProfile = serde_json::from_reader(reader).map_err(SourceError::from)?;
    Ok(profile)
}

/// Ingests, scores and (optionally) filters, returning jobs by descending relevance.
pub(crate) fn score_records(
    pipeline: &ServicePipeline,
    records: &[RawJobRecord],
    profile: Option<&UserProfile>,
) -> Result<Vec<ScoredJob>, AppError> {
    let now = Utc::now();
    pipeline.ingest(records, now)?;
    pipeline.score_stale(now)?;

    let profile = profile
        .cloned()
        .unwrap_or_else(|| UserProfile::new("batch"));
    let mut ranked = pipeline.matches_for(&profile)?;
    ranked.sort_by_key(|scored| {
        std::cmp::Reverse(scored.score.as_ref().map(|score| score.relevance_score))
    });
    Ok(ranked)
}

fn render_scored_job(scored: &ScoredJob) {
    let job = &scored.job;
    let company = if job.company_name.is_empty() {
        "unknown company"
    } else {
        job.company_name.as_str()
    };
    match &scored.score {
        Some(score) => println!(
            "- [{:>3}] {} @ {} ({}) | skills {} | salary {} | location {}",
            score.relevance_score,
            job.title,
            company,
            job.location,
            score.skill_match_score,
            score.salary_score,
            score.location_score
        ),
        None => println!("- [  -] {} @ {} ({})", job.title, company, job.location),
    }
    println!("        {}", job.source_url);
}

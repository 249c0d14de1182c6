use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use job_scout::config::PipelineConfig;
use job_scout::workflows::applications::{
    ApplicationStatus, ApplicationTracker, InMemoryApplicationStore,
};
use job_scout::workflows::ingest::{normalize, read_json};
use job_scout::workflows::jobs::{ExperienceLevel, InMemoryJobStore, JobRepository, ScoreRepository};
use job_scout::workflows::matching::{SkillSet, UserProfile};
use job_scout::workflows::notifications::{
    DispatchError, JobNotification, NotificationDispatcher,
};
use job_scout::workflows::pipeline::JobPipeline;
use job_scout::workflows::scoring::ScoringEngine;

const SCRAPED: &str = r#"[
    {
        "title": "Senior Python Django Developer",
        "company": "Acme",
        "salaryFrom": 4500,
        "salaryTo": 6000,
        "remoteWork": true,
        "description": "We use Django, PostgreSQL, Docker"
    },
    {
        "title": "Junior Frontend Developer",
        "company": "Globex",
        "location": "Tartu, Estonia",
        "salary": "1800 - 2400 €",
        "description": "React and TypeScript",
        "url": "https://www.cvkeskus.ee/frontend-7"
    },
    {
        "company": "Nameless OÜ",
        "description": "missing title"
    }
]"#;

fn observed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 24, 10, 0, 0).unwrap()
}

#[derive(Default)]
struct CollectingDispatcher {
    sent: Mutex<Vec<JobNotification>>,
}

impl NotificationDispatcher for CollectingDispatcher {
    fn dispatch(&self, notification: JobNotification) -> Result<(), DispatchError> {
        self.sent
            .lock()
            .expect("dispatcher mutex poisoned")
            .push(notification);
        Ok(())
    }
}

#[test]
fn remote_senior_python_posting_end_to_end() {
    let records = read_json(SCRAPED.as_bytes()).expect("export parses");
    let posting = normalize(&records[0], observed_at()).expect("title present");
    assert_eq!(posting.job.salary_min, Some(4500));
    assert_eq!(posting.job.salary_max, Some(6000));
    assert!(posting.job.is_remote);
    assert_eq!(posting.job.experience_level, ExperienceLevel::Senior);
    assert!(posting.job.source_url.starts_with("urn:job-scout:posting:"));

    let engine = ScoringEngine::default();
    let score = engine.score(&posting.job, observed_at());
    assert_eq!(score.location_score, 95);
    assert_eq!(score.salary_score, 45);
    // coverage 100, experience 100, freshness 100, completeness 50
    assert_eq!(score.relevance_score, 90);
    assert_eq!(score.skill_match_score, 11);
}

#[test]
fn pipeline_ingests_scores_matches_and_notifies() {
    let store = InMemoryJobStore::default();
    let dispatcher = Arc::new(CollectingDispatcher::default());
    let pipeline = JobPipeline::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        dispatcher.clone(),
        ScoringEngine::default(),
        PipelineConfig::default(),
    );

    let records = read_json(SCRAPED.as_bytes()).expect("export parses");
    let report = pipeline.ingest(&records, observed_at()).expect("ingest");
    assert_eq!(report.received, 3);
    assert_eq!(report.created, 2);
    assert_eq!(report.discarded, 1);
    assert_eq!(report.companies_created, 2);

    let scoring = pipeline.score_stale(observed_at()).expect("scoring");
    assert_eq!(scoring.scored, 2);

    let frontend = store
        .fetch("https://www.cvkeskus.ee/frontend-7")
        .expect("fetch")
        .expect("scored");
    // junior band 1500-3000: 50 + 300 * 50 / 1500
    assert_eq!(frontend.salary_score, 60);
    assert_eq!(frontend.location_score, 90);

    let ranked = pipeline.scores().expect("scores");
    assert!(ranked
        .windows(2)
        .all(|pair| pair[0].relevance_score >= pair[1].relevance_score));

    let mut profile = UserProfile::new("u-1");
    profile.skills = SkillSet::parse("django");
    profile.min_salary = Some(4000);
    profile.location_preference = Some("Tallinn".to_string());
    profile.telegram_chat_id = Some("1001".to_string());

    let matches = pipeline.matches_for(&profile).expect("matches");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].job.company_name, "Acme");

    let notified = pipeline.notify(&[profile]).expect("notify");
    assert_eq!(notified.dispatched, 1);
    let sent = dispatcher.sent.lock().expect("lock").clone();
    match &sent[..] {
        [JobNotification::Digest { jobs, .. }] => {
            assert_eq!(jobs.len(), 1);
            assert_eq!(jobs[0].relevance_score, Some(90));
        }
        other => panic!("expected one digest, got {other:?}"),
    }

    let maintenance = pipeline
        .run_maintenance(observed_at() + Duration::days(61))
        .expect("maintenance");
    assert_eq!(maintenance.deactivated, 2);
    assert!(store.active().expect("active").is_empty());
}

#[test]
fn application_reminders_flow_through_the_dispatcher() {
    let tracker = ApplicationTracker::new(Arc::new(InMemoryApplicationStore::default()));
    let profile = UserProfile::new("u-1");
    let url = "https://www.cvkeskus.ee/frontend-7";

    tracker
        .track(profile.user_id.clone(), url, "Junior Frontend Developer", observed_at())
        .expect("tracked");
    tracker
        .update_status(&profile.user_id, url, ApplicationStatus::Applied, observed_at())
        .expect("applied");
    let due = NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date");
    tracker
        .set_reminder(&profile.user_id, url, Some(due), observed_at())
        .expect("reminder set");

    let dispatcher = CollectingDispatcher::default();
    let early = tracker
        .dispatch_due_reminders(due - Duration::days(1), &dispatcher, observed_at())
        .expect("sweep");
    assert_eq!(early.due, 0);

    let report = tracker
        .dispatch_due_reminders(due, &dispatcher, observed_at())
        .expect("sweep");
    assert_eq!(report.dispatched, 1);

    let application = tracker.get(&profile.user_id, url).expect("tracked");
    assert_eq!(application.status, ApplicationStatus::Applied);
    assert_eq!(application.applied_at, Some(observed_at()));
    assert_eq!(application.reminder_date, None);
}

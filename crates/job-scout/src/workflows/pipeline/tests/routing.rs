use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::jobs::JobRepository;
use crate::workflows::pipeline::router::{score_handler, scores_handler};

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(&body).expect("serialize request"),
        ))
        .expect("build request")
}

#[tokio::test]
async fn ingest_route_accepts_scraper_payloads() {
    let (pipeline, store, _) = build_pipeline();
    let router = router_with(pipeline);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/jobs/ingest",
            json!([
                {
                    "title": "Senior Python Developer",
                    "company": "Acme",
                    "salaryFrom": "4500",
                    "remoteWork": "true",
                    "url": "https://www.cv.ee/et/vacancy/1"
                },
                { "company": "No Title OÜ" }
            ]),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["received"], 2);
    assert_eq!(payload["created"], 1);
    assert_eq!(payload["discarded"], 1);
    assert_eq!(store.job_count(), 1);
}

#[tokio::test]
async fn ingest_route_rejects_malformed_json() {
    let (pipeline, _, _) = build_pipeline();
    let router = router_with(pipeline);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/jobs/ingest")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .expect("build request"),
        )
        .await
        .expect("route executes");

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn matches_route_returns_filtered_jobs() {
    let (pipeline, _, _) = build_pipeline();
    pipeline
        .ingest(&[python_posting(), java_posting()], observed_at())
        .expect("ingest succeeds");
    pipeline.score_stale(observed_at()).expect("scoring pass");
    let router = router_with(pipeline);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/jobs/matches",
            json!({ "user_id": "u-1", "skills": "Spring, kotlin", "location_preference": "tartu" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["user_id"], "u-1");
    assert_eq!(payload["count"], 1);
    assert_eq!(payload["jobs"][0]["job"]["title"], "Java Developer");
    assert_eq!(payload["jobs"][0]["score"]["salary_score"], 62);
}

#[tokio::test]
async fn score_and_list_routes_round_out_the_pipeline() {
    let (pipeline, _, _) = build_pipeline();
    pipeline
        .ingest(&[python_posting()], observed_at())
        .expect("ingest succeeds");
    let pipeline = Arc::new(pipeline);

    let response = score_handler(State(pipeline.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["scored"], 1);

    let response = scores_handler(State(pipeline)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload[0]["source_url"], "https://www.cv.ee/et/vacancy/1");
    assert_eq!(payload[0]["location_score"], 95);
}

#[tokio::test]
async fn repository_outage_maps_to_service_unavailable() {
    let pipeline = Arc::new(unavailable_pipeline());

    let response = scores_handler(State(pipeline.clone())).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("database offline"));

    let response = crate::workflows::pipeline::job_router(pipeline)
        .oneshot(json_request(
            "POST",
            "/api/v1/jobs/ingest",
            json!([{ "title": "Developer", "url": "https://www.cv.ee/9" }]),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn notify_route_sends_digests_to_reachable_users() {
    let (pipeline, _, dispatcher) = build_pipeline();
    pipeline
        .ingest(&[python_posting()], observed_at())
        .expect("ingest succeeds");
    let router = router_with(pipeline);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/jobs/notify",
            json!([
                { "user_id": "u-1", "skills": "python", "telegram_chat_id": "1001" },
                { "user_id": "u-2", "skills": "python" }
            ]),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["profiles"], 2);
    assert_eq!(payload["dispatched"], 1);
    assert_eq!(payload["skipped"], 1);
    assert_eq!(dispatcher.sent().len(), 1);
}

#[tokio::test]
async fn maintenance_route_retires_stale_jobs_and_scores() {
    let (pipeline, store, _) = build_pipeline();
    pipeline
        .ingest(&[python_posting()], observed_at())
        .expect("ingest succeeds");
    pipeline.score_stale(observed_at()).expect("scoring pass");
    let router = router_with(pipeline);

    let response = router
        .oneshot(json_request("POST", "/api/v1/jobs/maintenance", json!(null)))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["deactivated"], 1);
    assert_eq!(payload["scores_purged"], 1);
    assert!(store.active().expect("active").is_empty());
}

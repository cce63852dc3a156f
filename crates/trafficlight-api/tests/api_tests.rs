//! Integration tests for the control API endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Timer-dependent tests run on Tokio's paused clock,
//! so a 5 second wait completes instantly and deterministically.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::time::{Instant, sleep};
use tower::ServiceExt;
use trafficlight_api::router::build_router;
use trafficlight_api::state::AppState;
use trafficlight_core::{TimingConfig, TrafficLightService};

fn make_service() -> Arc<TrafficLightService> {
    Arc::new(TrafficLightService::new(&TimingConfig::default()).unwrap())
}

fn make_router(service: &Arc<TrafficLightService>) -> Router {
    build_router(Arc::new(AppState::new(Arc::clone(service))))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn current_state(router: &Router) -> Value {
    let (status, json) = send(
        router,
        Request::get("/status").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["state"].clone()
}

fn post(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let router = make_router(&make_service());

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_status_starts_red() {
    let router = make_router(&make_service());

    let (status, json) = send(
        &router,
        Request::get("/status").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "Red");
    assert!(json["last_changed"].is_string());
}

#[tokio::test]
async fn test_manual_override() {
    let router = make_router(&make_service());

    let (status, json) = send(&router, post("/manual?state=Yellow")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["message"], "Manual override: Yellow");
    assert_eq!(json["state"], "Yellow");
    assert_eq!(current_state(&router).await, "Yellow");
}

#[tokio::test]
async fn test_manual_override_ignores_case() {
    let router = make_router(&make_service());

    let (status, json) = send(&router, post("/manual?state=green")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "Green");
}

#[tokio::test]
async fn test_manual_invalid_state_is_bad_request() {
    let service = make_service();
    let router = make_router(&service);

    let (status, json) = send(&router, post("/manual?state=Purple")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("Purple"));
    assert_eq!(current_state(&router).await, "Red");
}

#[tokio::test]
async fn test_manual_missing_state_is_bad_request() {
    let router = make_router(&make_service());

    let (status, json) = send(&router, post("/manual")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("state"));
}

#[tokio::test]
async fn test_manual_requires_post() {
    let router = make_router(&make_service());

    let response = router
        .oneshot(
            Request::get("/manual?state=Red")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test(start_paused = true)]
async fn test_pedestrian_responds_after_crossing_completes() {
    let router = make_router(&make_service());
    let start = Instant::now();

    let (status, json) = send(&router, post("/pedestrian")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["state"], "Green");
    assert!(start.elapsed() >= Duration::from_secs(5));
    assert_eq!(current_state(&router).await, "Green");
}

#[tokio::test(start_paused = true)]
async fn test_pedestrian_holds_red_while_waiting() {
    let router = make_router(&make_service());
    router
        .clone()
        .oneshot(post("/manual?state=Green"))
        .await
        .unwrap();

    let observer = async {
        sleep(Duration::from_millis(10)).await;
        let early = current_state(&router).await;
        sleep(Duration::from_secs(4)).await;
        let late = current_state(&router).await;
        (early, late)
    };

    let ((status, _), (early, late)) = tokio::join!(send(&router, post("/pedestrian")), observer);

    assert_eq!(status, StatusCode::OK);
    assert_eq!(early, "Red");
    assert_eq!(late, "Red");
    assert_eq!(current_state(&router).await, "Green");
}

#[tokio::test(start_paused = true)]
async fn test_full_scenario_with_cycle_running() {
    let service = make_service();
    let cycle = service.spawn_cycle();
    let router = make_router(&service);

    assert_eq!(current_state(&router).await, "Red");

    sleep(Duration::from_millis(5_100)).await;
    assert_eq!(current_state(&router).await, "Green");

    let (status, _) = send(&router, post("/manual?state=Yellow")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current_state(&router).await, "Yellow");

    let observer = async {
        sleep(Duration::from_millis(10)).await;
        current_state(&router).await
    };
    let ((status, _), during) = tokio::join!(send(&router, post("/pedestrian")), observer);

    assert_eq!(status, StatusCode::OK);
    assert_eq!(during, "Red");
    assert_eq!(current_state(&router).await, "Green");

    cycle.abort();
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let router = make_router(&make_service());

    let response = router
        .oneshot(
            Request::get("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

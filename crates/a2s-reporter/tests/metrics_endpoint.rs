//! `/metrics` endpoint tests.
//!
//! Drives the exporter router in-process and checks the exposition a
//! scraper would see before and after the reconciler publishes state.

use std::sync::Arc;

use a2s_engine::{ProbeOutcome, Reconciler, ServerSnapshot};
use a2s_metrics::MetricStore;
use a2s_reporter::build_router;
use a2s_reporter::exporter::OPENMETRICS_CONTENT_TYPE;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn scrape(router: axum::Router) -> (StatusCode, String, String) {
    let req = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();

    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

fn snapshot(identity: &str, map: &str, players: u32) -> ProbeOutcome {
    ProbeOutcome::Snapshot(ServerSnapshot {
        identity: identity.to_string(),
        map: map.to_string(),
        players,
        max_players: 10,
        bots: 1,
        password_protected: false,
        anticheat_enabled: true,
    })
}

#[tokio::test]
async fn fresh_store_reports_down() {
    let router = build_router(Arc::new(MetricStore::new()));

    let (status, content_type, body) = scrape(router).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, OPENMETRICS_CONTENT_TYPE);

    for line in [
        "a2s_server_status 0",
        "a2s_server_player_count 0",
        "a2s_server_max_player_count 0",
        "a2s_server_bots 0",
        "a2s_server_password_set 0",
        "a2s_server_vac_enabled 0",
    ] {
        assert!(body.lines().any(|l| l == line), "missing `{line}` in:\n{body}");
    }
    assert!(!body.contains("a2s_server_player_count_with_server_name{"));
    assert!(!body.contains("a2s_server_map_info{"));
}

#[tokio::test]
async fn scrape_reflects_reconciled_state() {
    let store = Arc::new(MetricStore::new());
    let mut reconciler = Reconciler::new(store.clone());
    let router = build_router(store);

    reconciler.apply(&snapshot("Server A", "de_dust2", 5));
    let (_, _, body) = scrape(router.clone()).await;
    assert!(body.contains("a2s_server_status 1"));
    assert!(body.contains("a2s_server_player_count_with_server_name{server=\"Server A\"} 5"));
    assert!(body.contains("a2s_server_map_info{server_name=\"Server A\",map=\"de_dust2\"} 1"));

    reconciler.apply(&snapshot("Server B", "de_inferno", 2));
    let (_, _, body) = scrape(router.clone()).await;
    assert!(!body.contains("server=\"Server A\""));
    assert!(!body.contains("server_name=\"Server A\""));
    assert!(body.contains("a2s_server_player_count_with_server_name{server=\"Server B\"} 2"));
    assert!(body.contains("a2s_server_map_info{server_name=\"Server B\",map=\"de_inferno\"} 1"));

    reconciler.apply(&ProbeOutcome::failure("timeout"));
    let (_, _, body) = scrape(router).await;
    assert!(body.contains("a2s_server_status 0"));
    assert!(!body.contains("a2s_server_player_count_with_server_name{"));
    assert!(!body.contains("a2s_server_map_info{"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let router = build_router(Arc::new(MetricStore::new()));

    let req = Request::builder()
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_is_rejected() {
    let router = build_router(Arc::new(MetricStore::new()));

    let req = Request::builder()
        .method("POST")
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

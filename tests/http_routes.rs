use std::path::Path;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use proms_calendar_lib::{build_state, config::AppConfig, web};
use tower::ServiceExt;

fn fixture() -> String {
    format!("{}/tests/fixtures/listing.html", env!("CARGO_MANIFEST_DIR"))
}

fn app(local: &str, static_dir: &Path) -> Router {
    let static_dir = static_dir.display().to_string();
    let config = AppConfig::from_lookup(|key| match key {
        "LOCAL" => Some(local.to_string()),
        "PROMS_STATIC_DIR" => Some(static_dir.clone()),
        _ => None,
    })
    .expect("config");
    web::router(build_state(&config), &config.static_dir)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("response");
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, content_type, String::from_utf8_lossy(&body).into_owned())
}

#[tokio::test]
async fn listing_shows_allowed_venues_only() {
    let static_dir = tempfile::tempdir().expect("tempdir");
    let app = app(&fixture(), static_dir.path());

    let (status, _, body) = get(&app, "/proms/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Opening Night"));
    assert!(body.contains("Royal Albert Hall"));
    assert!(!body.contains("Fringe Night"));
}

#[tokio::test]
async fn listing_json_groups_by_day() {
    let static_dir = tempfile::tempdir().expect("tempdir");
    let app = app(&fixture(), static_dir.path());

    let (status, _, body) = get(&app, "/proms/schedule.json").await;
    assert_eq!(status, StatusCode::OK);
    let days: serde_json::Value = serde_json::from_str(&body).expect("json");
    let days = days.as_array().expect("array of days");
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["date"], "2024-01-01");
    let events = days[0]["events"].as_array().expect("events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], "opening-night");
    assert_eq!(events[0]["start"], "2024-01-01T19:30:00+00:00");
    assert_eq!(events[0]["end"], "2024-01-01T20:25:00+00:00");
    assert_eq!(events[0]["programme"][0]["composer"], "Beethoven");
    assert_eq!(events[0]["programme"][0]["duration"], 35);
}

#[tokio::test]
async fn calendar_file_with_and_without_suffix() {
    let static_dir = tempfile::tempdir().expect("tempdir");
    let app = app(&fixture(), static_dir.path());

    for uri in ["/proms/opening-night.ics", "/proms/opening-night"] {
        let (status, content_type, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/calendar"));
        assert!(body.contains("SUMMARY:Opening Night"));
        assert!(body.contains("DTSTART:20240101T193000Z"));
        assert!(body.contains("DTEND:20240101T202500Z"));
        assert_eq!(body.matches("BEGIN:VALARM").count(), 2);
    }
}

#[tokio::test]
async fn unlisted_venue_is_still_exported() {
    let static_dir = tempfile::tempdir().expect("tempdir");
    let app = app(&fixture(), static_dir.path());

    let (status, _, body) = get(&app, "/proms/fringe-night.ics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("SUMMARY:Fringe Night"));
    assert!(body.contains("LOCATION:Unknown Hall"));
}

#[tokio::test]
async fn unknown_id_is_empty_404() {
    let static_dir = tempfile::tempdir().expect("tempdir");
    let app = app(&fixture(), static_dir.path());

    let (status, _, body) = get(&app, "/proms/no-such-prom.ics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
}

#[tokio::test]
async fn serves_static_files() {
    let static_dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(static_dir.path().join("proms.css"), "body {}").expect("write css");
    let app = app(&fixture(), static_dir.path());

    let (status, _, body) = get(&app, "/proms/static/proms.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "body {}");
}

#[tokio::test]
async fn unreadable_source_is_500() {
    let static_dir = tempfile::tempdir().expect("tempdir");
    let app = app("/nonexistent/listing.html", static_dir.path());

    let (status, _, _) = get(&app, "/proms/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _, _) = get(&app, "/proms/opening-night.ics").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

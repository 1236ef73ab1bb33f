mod common;

use std::sync::Arc;
use std::time::Duration;
use axum::http::StatusCode;
use common::{parse_body, FailingGuestRepo, SlowGuestRepo, TestApp, TestOptions};
use serde_json::json;
use wedding_rsvp::domain::models::rsvp::Rsvp;

#[tokio::test]
async fn test_party_lookup_prechecks_confirmed_members() {
    let app = TestApp::new().await;
    app.seed_guest("Ada", "Lovelace", Some("g7")).await;
    app.seed_guest("Bea", "Lovelace", Some("g7")).await;
    app.seed_guest("Cal", "Babbage", Some("g7")).await;

    app.state.rsvp_repo.upsert_party(&[
        Rsvp::for_member("Ada".into(), "Lovelace".into(), "g7", true, 1),
        Rsvp::for_member("Bea".into(), "Lovelace".into(), "g7", false, 0),
    ]).await.unwrap();

    let response = app.get("/api/rsvp/party?firstName=Ada&lastName=Lovelace", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;

    assert_eq!(body["found"], true);
    assert_eq!(body["groupId"], "g7");
    assert_eq!(body["locked"], false);
    assert_eq!(body["attendance"], json!({
        "Ada Lovelace": true,
        "Bea Lovelace": false,
        "Cal Babbage": false
    }));
    assert_eq!(body["selectedCount"], 1);

    let names: Vec<&str> = body["members"].as_array().unwrap()
        .iter()
        .map(|m| m["fullName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Cal Babbage", "Ada Lovelace", "Bea Lovelace"]);
}

#[tokio::test]
async fn test_submitter_is_prechecked_even_without_a_row() {
    let app = TestApp::new().await;
    app.seed_guest("Ada", "Lovelace", Some("g7")).await;
    app.seed_guest("Bea", "Lovelace", Some("g7")).await;

    let body = parse_body(app.get("/api/rsvp/party?firstName=bea&lastName=LOVELACE", None).await).await;

    assert_eq!(body["attendance"]["Bea Lovelace"], true);
    assert_eq!(body["attendance"]["Ada Lovelace"], false);
}

#[tokio::test]
async fn test_unknown_or_groupless_guest_is_not_found() {
    let app = TestApp::new().await;
    app.seed_guest("Solo", "Traveller", None).await;

    for uri in [
        "/api/rsvp/party?firstName=Nobody&lastName=Here",
        "/api/rsvp/party?firstName=Solo&lastName=Traveller",
        "/api/rsvp/party?firstName=&lastName=",
        "/api/rsvp/party",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_body(response).await;
        assert_eq!(body["found"], false, "{}", uri);
        assert!(body["members"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_lookup_reports_locked_group() {
    let app = TestApp::new().await;
    app.seed_guest("Ada", "Lovelace", Some("g7")).await;

    app.post_json("/api/rsvp", &json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "attending": true
    })).await;

    let body = parse_body(app.get("/api/rsvp/party?firstName=Ada&lastName=Lovelace", None).await).await;
    assert_eq!(body["found"], true);
    assert_eq!(body["locked"], true);
    assert_eq!(body["attendance"]["Ada Lovelace"], true);
}

#[tokio::test]
async fn test_failing_directory_reads_as_not_found() {
    let app = TestApp::with_options(TestOptions {
        guest_repo: Some(Arc::new(FailingGuestRepo)),
        ..TestOptions::default()
    }).await;

    let response = app.get("/api/rsvp/party?firstName=Ada&lastName=Lovelace", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert_eq!(body["found"], false);
    assert!(body["members"].as_array().unwrap().is_empty());
    assert_eq!(body["selectedCount"], 0);
}

#[tokio::test]
async fn test_slow_directory_reads_as_not_found() {
    let app = TestApp::with_options(TestOptions {
        guest_repo: Some(Arc::new(SlowGuestRepo { delay: Duration::from_secs(2) })),
        store_timeout: Duration::from_millis(50),
        ..TestOptions::default()
    }).await;

    let response = app.get("/api/rsvp/party?firstName=Ada&lastName=Lovelace", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_body(response).await["found"], false);
}

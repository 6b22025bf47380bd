// Tests for the HTTP routes, driven without a listening socket
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use uniformityvalidator::api::{router, AppState};

fn app() -> axum::Router {
    router(AppState {
        default_alpha: 0.05,
    })
}

async fn post_validate(body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/validate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_validate_single_test() {
    let (status, body) = post_validate(json!({
        "numbers": "0.5#0.5#0.5#0.5#0.5#0.5#0.5#0.5#0.5#0.5",
        "test": "means"
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["alpha"], 0.05);
    assert_eq!(body["reports"][0]["result"]["statistic"], 0.0);
    assert_eq!(body["reports"][0]["chart"]["kind"], "histogram");
}

#[tokio::test]
async fn test_validate_suite_uses_request_alpha() {
    let (status, body) = post_validate(json!({
        "numbers": "0.13#0.42#0.67#0.91#0.05#0.38#0.74#0.29#0.56#0.88",
        "alpha": 0.01
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alpha"], 0.01);
    assert_eq!(body["sample_size"], 10);
    assert!(body["summary"].as_str().unwrap().contains("Uniformity Analysis"));
}

#[tokio::test]
async fn test_validate_reports_parse_error() {
    let (status, body) = post_validate(json!({ "numbers": "0.1#oops" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert!(body["message"].as_str().unwrap().contains("oops"));
}

#[tokio::test]
async fn test_validate_unknown_test_is_reported() {
    let (status, body) = post_validate(json!({ "numbers": "0.1", "test": "runs" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert!(body["message"].as_str().unwrap().contains("runs"));
    assert_eq!(body["reports"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_validate_accepts_test_aliases() {
    let (status, body) = post_validate(json!({
        "numbers": "0.13#0.42#0.67#0.91#0.05#0.38#0.74#0.29#0.56#0.88",
        "test": "Kolmogorov-Smirnov"
    }))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reports"][0]["test"], "ks");
}

#[tokio::test]
async fn test_list_tests() {
    let request = Request::builder()
        .uri("/api/tests")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let tests: Value = serde_json::from_slice(&bytes).unwrap();
    let ids: Vec<&str> = tests
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["means", "variance", "ks", "chi2", "poker"]);
}

#[tokio::test]
async fn test_version() {
    let request = Request::builder()
        .uri("/api/version")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

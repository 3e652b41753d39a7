// libs/booking-cell/tests/handlers_test.rs
//
// Request-shape failures at the router boundary: bodies that never reach
// the service layer still answer with the API's error JSON.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use booking_cell::router::booking_routes;
use shared_config::AppConfig;

fn test_router() -> Router {
    // Handlers reject these requests before touching storage, so the
    // endpoint does not need to exist.
    booking_routes(Arc::new(AppConfig {
        database_url: "http://127.0.0.1:1".to_string(),
        database_service_key: "test-service-key".to_string(),
        admin_api_key: "test-admin-key".to_string(),
        mailer_base_url: String::new(),
        mailer_api_token: String::new(),
        mail_from_address: "no-reply@test.local".to_string(),
        mail_from_name: "Test Desk".to_string(),
    }))
}

async fn post_json(router: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_missing_required_fields_return_400_error_json() {
    // provider_id alone is not a bookable request
    let (status, body) = post_json(
        test_router(),
        "/",
        r#"{"provider_id": "550e8400-e29b-41d4-a716-446655440000"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("error").is_some(), "body was {}", body);
}

#[tokio::test]
async fn test_malformed_json_returns_400_error_json() {
    let (status, body) = post_json(test_router(), "/", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("error").is_some(), "body was {}", body);
}

#[tokio::test]
async fn test_invalid_field_type_returns_400_error_json() {
    let (status, body) = post_json(
        test_router(),
        "/",
        r#"{"provider_id": 42, "service_id": "x", "customer_name": "A",
            "customer_email": "a@b.fr", "date": "2025-03-05", "start_time": "09:00:00"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("error").is_some(), "body was {}", body);
}

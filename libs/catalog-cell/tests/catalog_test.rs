// libs/catalog-cell/tests/catalog_test.rs

use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalog_cell::models::{CatalogError, CreateServiceRequest};
use catalog_cell::services::CatalogService;
use shared_config::AppConfig;
use shared_database::PostgrestClient;

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        database_url: base_url.to_string(),
        database_service_key: "test-service-key".to_string(),
        admin_api_key: "test-admin-key".to_string(),
        mailer_base_url: String::new(),
        mailer_api_token: String::new(),
        mail_from_address: "no-reply@test.local".to_string(),
        mail_from_name: "Test Desk".to_string(),
    }
}

async fn catalog_over(mock_server: &MockServer) -> CatalogService {
    let config = test_config(&mock_server.uri());
    CatalogService::with_client(Arc::new(PostgrestClient::new(&config)))
}

fn service_row(id: Uuid, duration_minutes: i32) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Consultation",
        "description": null,
        "duration_minutes": duration_minutes,
        "price_cents": 4500,
        "is_active": true,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn test_create_service_succeeds() {
    let mock_server = MockServer::start().await;
    let catalog = catalog_over(&mock_server).await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(201).set_body_json(vec![service_row(id, 30)]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = catalog
        .create_service(CreateServiceRequest {
            name: "Consultation".to_string(),
            description: None,
            duration_minutes: 30,
            price_cents: Some(4500),
        })
        .await
        .unwrap();

    assert_eq!(service.id, id);
    assert_eq!(service.duration_minutes, 30);
}

#[tokio::test]
async fn test_create_service_rejects_blank_name() {
    let mock_server = MockServer::start().await;
    let catalog = catalog_over(&mock_server).await;

    let result = catalog
        .create_service(CreateServiceRequest {
            name: "  ".to_string(),
            description: None,
            duration_minutes: 30,
            price_cents: None,
        })
        .await;

    assert_matches!(result, Err(CatalogError::Validation(_)));
}

#[tokio::test]
async fn test_create_service_rejects_out_of_range_duration() {
    let mock_server = MockServer::start().await;
    let catalog = catalog_over(&mock_server).await;

    for duration in [0, -15, 3, 481] {
        let result = catalog
            .create_service(CreateServiceRequest {
                name: "Consultation".to_string(),
                description: None,
                duration_minutes: duration,
                price_cents: None,
            })
            .await;
        assert_matches!(result, Err(CatalogError::Validation(_)), "duration {}", duration);
    }
}

#[tokio::test]
async fn test_get_service_maps_empty_result_to_not_found() {
    let mock_server = MockServer::start().await;
    let catalog = catalog_over(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<serde_json::Value>::new()))
        .mount(&mock_server)
        .await;

    let result = catalog.get_service(Uuid::new_v4()).await;
    assert_matches!(result, Err(CatalogError::NotFound));
}

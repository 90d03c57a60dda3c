use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_clients::{CatalogClient, IdentityClient};
use shared_config::AppConfig;
use shared_models::error::EngineError;

fn config_with_identity(url: &str) -> AppConfig {
    AppConfig { identity_service_url: url.to_string(), ..AppConfig::default() }
}

fn config_with_catalog(url: &str) -> AppConfig {
    AppConfig { catalog_service_url: url.to_string(), ..AppConfig::default() }
}

#[tokio::test]
async fn test_active_staff_passes_identity_check() {
    let server = MockServer::start().await;
    let staff_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/users/{}", staff_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": staff_id,
            "role": "staff",
            "status": "active"
        })))
        .mount(&server)
        .await;

    let client = IdentityClient::new(&config_with_identity(&server.uri()));
    client.ensure_active_user(staff_id, "staff").await.unwrap();
}

#[tokio::test]
async fn test_role_mismatch_is_a_validation_error() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/users/{}", user_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": user_id,
            "role": "client",
            "status": "active"
        })))
        .mount(&server)
        .await;

    let client = IdentityClient::new(&config_with_identity(&server.uri()));
    let result = client.ensure_active_user(user_id, "staff").await;
    assert_matches!(result, Err(EngineError::Validation(_)));
}

#[tokio::test]
async fn test_suspended_user_rejected() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/users/{}", user_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": user_id,
            "role": "staff",
            "status": "suspended"
        })))
        .mount(&server)
        .await;

    let client = IdentityClient::new(&config_with_identity(&server.uri()));
    let result = client.ensure_active_user(user_id, "staff").await;
    assert_matches!(result, Err(EngineError::Validation(_)));
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/users/{}", user_id)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = IdentityClient::new(&config_with_identity(&server.uri()));
    let result = client.ensure_active_user(user_id, "staff").await;
    assert_matches!(result, Err(EngineError::NotFound("user")));
}

#[tokio::test]
async fn test_unconfigured_identity_skips_check() {
    let client = IdentityClient::new(&AppConfig::default());
    client
        .ensure_active_user(Uuid::new_v4(), "staff")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unknown_service_is_not_found() {
    let server = MockServer::start().await;
    let service_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/services/{}", service_id)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = CatalogClient::new(&config_with_catalog(&server.uri()));
    let result = client.get_service(service_id).await;
    assert_matches!(result, Err(EngineError::NotFound("service")));
}

#[tokio::test]
async fn test_catalog_lookup_returns_service() {
    let server = MockServer::start().await;
    let service_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/services/{}", service_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": service_id,
            "name": "Deep tissue massage",
            "duration_minutes": 60
        })))
        .mount(&server)
        .await;

    let client = CatalogClient::new(&config_with_catalog(&server.uri()));
    let service = client.get_service(service_id).await.unwrap().unwrap();
    assert_eq!(service.id, service_id);
    assert_eq!(service.duration_minutes, 60);
}

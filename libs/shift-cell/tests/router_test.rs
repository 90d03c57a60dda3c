use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use shared_config::AppConfig;
use shared_store::EngineState;
use shift_cell::router::shift_routes;

fn test_state() -> Arc<EngineState> {
    EngineState::new(AppConfig::default())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_create_and_approve_shift_over_http() {
    let state = test_state();
    let app = shift_routes(state);

    let staff_id = uuid::Uuid::new_v4();
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "staff_id": staff_id,
                "date": "2024-06-10",
                "shift_type": "morning"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["shift"]["status"], json!("pending"));
    let shift_id = body["shift"]["id"].as_str().unwrap().to_string();

    let approve = Request::builder()
        .method("POST")
        .uri(format!("/{}/approve", shift_id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(approve).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["shift"]["status"], json!("approved"));
}

#[tokio::test]
async fn test_invalid_custom_shift_returns_bad_request() {
    let app = shift_routes(test_state());

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "staff_id": uuid::Uuid::new_v4(),
                "date": "2024-06-10",
                "shift_type": "custom"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_shift_returns_not_found() {
    let app = shift_routes(test_state());

    let request = Request::builder()
        .method("POST")
        .uri(format!("/{}/approve", uuid::Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_availability_query_reflects_approved_shifts() {
    let state = test_state();
    let app = shift_routes(state);
    let staff_id = uuid::Uuid::new_v4();

    let create = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "staff_id": staff_id,
                "date": "2024-06-10",
                "shift_type": "evening"
            })
            .to_string(),
        ))
        .unwrap();
    let body = body_json(app.clone().oneshot(create).await.unwrap()).await;
    let shift_id = body["shift"]["id"].as_str().unwrap().to_string();

    let approve = Request::builder()
        .method("POST")
        .uri(format!("/{}/approve", shift_id))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(approve).await.unwrap();

    let query = Request::builder()
        .method("GET")
        .uri(format!("/availability?staff_id={}&date=2024-06-10", staff_id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(query).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let intervals = body["availability"]["intervals"].as_array().unwrap();
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0]["start"], json!("17:00:00"));
}

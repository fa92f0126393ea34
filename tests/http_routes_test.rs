use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use salon_manager::config::Config;
use salon_manager::db::{Database, MemoryStore};
use salon_manager::functions::{admins, services};
use salon_manager::http::{AppState, create_router};
use salon_manager::models::{ServiceCategory, ServiceInput};

async fn app() -> (Router, i32) {
    let db: Database = Arc::new(MemoryStore::new());
    admins::ensure_admin(db.as_ref(), "admin", "letmein").await.unwrap();
    let service = services::create_service(
        db.as_ref(),
        ServiceInput {
            name: "Blow dry".to_string(),
            category: ServiceCategory::Hair,
            price: 30.0,
            duration_minutes: 45,
            description: None,
            active: true,
        },
    )
    .await
    .unwrap();

    let state = AppState {
        db,
        config: Arc::new(Config::default()),
    };
    (create_router(state), service.id)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_public_booking_creates_pending_appointment() {
    let (app, service_id) = app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/booking/appointments",
            json!({
                "serviceIds": [service_id],
                "date": "2030-06-14",
                "time": "10:00",
                "name": "Nour",
                "phone": "0661 00 11 22"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let appointment = body_json(response).await;
    assert_eq!(appointment["status"], "pending");
    assert_eq!(appointment["time"], "10:00");
    assert_eq!(appointment["serviceIds"], json!([service_id]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/booking/slots?date=2030-06-14")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let slots = body["slots"].as_array().unwrap();
    let ten = slots.iter().find(|s| s["time"] == "10:00").unwrap();
    assert_eq!(ten["booked"], true);
    assert_eq!(slots[0]["time"], "09:00");
    assert_eq!(slots[0]["booked"], false);
}

#[tokio::test]
async fn test_booking_without_services_is_rejected() {
    let (app, _) = app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/booking/appointments",
            json!({
                "serviceIds": [],
                "date": "2030-06-14",
                "time": "10:00",
                "name": "Nour",
                "phone": "0661 00 11 22"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_login() {
    let (app, _) = app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/login",
            json!({ "username": "admin", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/login",
            json!({ "username": "admin", "password": "letmein" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
}

#[tokio::test]
async fn test_completing_unknown_appointment_is_not_found() {
    let (app, _) = app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/appointments/999/complete",
            json!({ "amount": 30.0, "paymentMethod": "cash" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_payment_method_is_a_validation_error() {
    let (app, _) = app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/appointments/1/complete",
            json!({ "amount": 10, "paymentMethod": "bitcoin" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("bitcoin"));
}

#[tokio::test]
async fn test_malformed_requests_get_json_errors() {
    let (app, _) = app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/booking/appointments")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/admin/services/abc").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/booking/slots?date=tomorrow")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_public_services_hide_inactive() {
    let (app, service_id) = app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/services/{service_id}/active"),
            json!({ "active": false }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/api/services").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!([]));
}

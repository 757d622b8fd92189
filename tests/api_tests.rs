mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{harness, Harness};
use ecotrack::create_router;
use ecotrack::repositories::OrderRepository;
use ecotrack::test_utils::GeoScript;

fn app(h: &Harness) -> Router {
    create_router(h.state.clone())
}

async fn send(app: Router, method: &str, uri: &str, user: Option<Uuid>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user {
        request = request.header("x-user-id", user_id.to_string());
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

fn pet_body() -> Value {
    json!({
        "material_type": "PET",
        "volume_kg": 100.0,
        "pickup_address": "Address A"
    })
}

#[tokio::test]
async fn test_health_check() {
    let h = harness(GeoScript::Distance(20.0)).await;
    let (status, body) = send(app(&h), "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "ecotrack");
}

#[tokio::test]
async fn test_register_user_and_duplicate() {
    let h = harness(GeoScript::Distance(20.0)).await;
    let request = json!({"email": "driver@logistic.com", "company_name": "Acme"});

    let (status, body) = send(app(&h), "POST", "/api/users", None, Some(request.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["role"], "logistic");
    assert_eq!(body["data"]["role_source"], "domain");

    let (status, body) = send(app(&h), "POST", "/api/users", None, Some(request)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_invalid_email_is_validation_error() {
    let h = harness(GeoScript::Distance(20.0)).await;
    let (status, body) = send(app(&h), "POST", "/api/users", None, Some(json!({"email": "nope"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_or_unknown_acting_user() {
    let h = harness(GeoScript::Distance(20.0)).await;

    let (status, body) = send(app(&h), "POST", "/api/orders", None, Some(pet_body())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(app(&h), "GET", "/api/orders", Some(Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_order_over_http() {
    let h = harness(GeoScript::Distance(20.0)).await;

    let (status, body) = send(app(&h), "POST", "/api/orders", Some(h.client.id), Some(pet_body())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["status"], "routed");
    assert_eq!(decimal(&body["order"]["price"]), Decimal::from(3900));
    assert_eq!(body["route"]["options"].as_array().unwrap().len(), 3);
    assert!(body["routing_error"].is_null());

    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    let (status, route) = send(app(&h), "GET", &format!("/api/orders/{}/route", order_id), Some(h.client.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(route["order_id"], order_id.as_str());
}

#[tokio::test]
async fn test_create_order_reports_routing_error() {
    let h = harness(GeoScript::Distance(20.0)).await;
    h.store.set_fail_route_inserts(true);

    let (status, body) = send(app(&h), "POST", "/api/orders", Some(h.client.id), Some(pet_body())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["status"], "pending");
    assert!(body["route"].is_null());
    assert_eq!(body["routing_error"]["code"], "ROUTE_CREATION_FAILED");

    h.store.set_fail_route_inserts(false);
    let order_id = body["order"]["id"].as_str().unwrap();
    let (status, body) = send(
        app(&h),
        "POST",
        &format!("/api/orders/{}/route/retry", order_id),
        Some(h.client.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "routed");
}

#[tokio::test]
async fn test_select_advance_and_errors_over_http() {
    let h = harness(GeoScript::Distance(20.0)).await;
    let (_, created) = send(app(&h), "POST", "/api/orders", Some(h.client.id), Some(pet_body())).await;
    let order_id = created["order"]["id"].as_str().unwrap().to_string();
    let route_id = created["route"]["id"].as_str().unwrap().to_string();
    let standard = created["route"]["options"][1]["id"].as_str().unwrap().to_string();
    let select_uri = format!("/api/routes/{}/select", route_id);

    // Un cliente no puede elegir
    let (status, _) = send(app(&h), "POST", &select_uri, Some(h.client.id), Some(json!({"option_id": standard}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        app(&h),
        "POST",
        &select_uri,
        Some(h.logistic.id),
        Some(json!({"option_id": Uuid::new_v4()})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(app(&h), "POST", &select_uri, Some(h.logistic.id), Some(json!({"option_id": standard}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "accepted");

    let (status, body) = send(app(&h), "POST", &select_uri, Some(h.admin.id), Some(json!({"option_id": standard}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_SELECTED");

    let advance_uri = format!("/api/orders/{}/advance", order_id);
    let (status, body) = send(app(&h), "POST", &advance_uri, Some(h.manager.id), Some(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TRANSITION");
    assert_eq!(body["details"]["current_status"], "accepted");
    assert_eq!(body["details"]["attempted_status"], "completed");

    let (status, body) = send(app(&h), "POST", &advance_uri, Some(h.manager.id), Some(json!({"status": "processing"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processing");

    let (status, body) = send(app(&h), "POST", &format!("/api/orders/{}/cancel", order_id), Some(h.client.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(decimal(&body["price"]), Decimal::from(3900));
}

#[tokio::test]
async fn test_admin_role_change_over_http() {
    let h = harness(GeoScript::Distance(20.0)).await;
    let uri = format!("/api/users/{}/role", h.client.id);

    let (status, _) = send(app(&h), "PUT", &uri, Some(h.manager.id), Some(json!({"role": "logistic"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(app(&h), "PUT", &uri, Some(h.admin.id), Some(json!({"role": "logistic"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "logistic");
    assert_eq!(body["data"]["role_source"], "admin");

    let (status, body) = send(app(&h), "GET", &format!("/api/users/{}", h.client.id), Some(h.client.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "logistic");
}

#[tokio::test]
async fn test_price_quote() {
    let h = harness(GeoScript::Distance(20.0)).await;

    let (status, body) = send(
        app(&h),
        "GET",
        "/api/pricing/quote?material_type=PET&volume_kg=100&distance_km=20",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["price"]), Decimal::from(3900));
    assert_eq!(body["environmental_impact"], 150.0);

    let (status, body) = send(
        app(&h),
        "GET",
        "/api/pricing/quote?material_type=PET&volume_kg=100&pickup_address=Address%20A",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["distance_km"], 20.0);

    let (status, body) = send(app(&h), "GET", "/api/pricing/quote?material_type=PET&volume_kg=-1&distance_km=5", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_price_quote_geo_unavailable() {
    let h = harness(GeoScript::Fail).await;

    let (status, body) = send(
        app(&h),
        "GET",
        "/api/pricing/quote?material_type=HDPE&volume_kg=10&pickup_address=Nowhere",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "GEO_UNAVAILABLE");
}

#[tokio::test]
async fn test_oversized_volume_is_rejected_not_a_crash() {
    let h = harness(GeoScript::Distance(20.0)).await;

    let (status, body) = send(
        app(&h),
        "GET",
        "/api/pricing/quote?material_type=PET&volume_kg=1e28&distance_km=0",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let order = json!({
        "material_type": "PET",
        "volume_kg": 1e28,
        "pickup_address": "Address A"
    });
    let (status, body) = send(app(&h), "POST", "/api/orders", Some(h.client.id), Some(order)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(h.store.list_orders(None).await.unwrap().is_empty());
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use device_registry_core::Resolver;
use device_registry_health::HealthRegistry;
use device_registry_service::handlers::{self, AppState};
use device_registry_store_etcd::MockStore;
use tower::ServiceExt;

fn test_app() -> (axum::Router, MockStore) {
    let store = MockStore::new();
    let resolver = Resolver::new(Arc::new(store.clone()));
    let readiness = HealthRegistry::new("readiness");
    let state = Arc::new(AppState { resolver, readiness });
    (handlers::app(state), store)
}

fn json_body(json: serde_json::Value) -> Body {
    Body::from(serde_json::to_vec(&json).unwrap())
}

#[tokio::test]
async fn set_and_get_gateway_round_trips() {
    let (app, _store) = test_app();

    let put_request = Request::builder()
        .method(Method::PUT)
        .uri("/tenants/T1/devices/dev-1/gateway")
        .header("content-type", "application/json")
        .body(json_body(serde_json::json!({ "gateway-id": "gw-1" })))
        .unwrap();
    let response = app.clone().oneshot(put_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let get_request = Request::builder()
        .method(Method::GET)
        .uri("/tenants/T1/devices/dev-1/gateway")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(get_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["gateway-id"], "gw-1");
}

#[tokio::test]
async fn get_gateway_not_found_is_404() {
    let (app, _store) = test_app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/tenants/T1/devices/absent/gateway")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn remove_adapter_instance_without_matching_value_is_409() {
    let (app, store) = test_app();
    store.seed("ai@@T1@@dev-1", "adapter-A");

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/tenants/T1/devices/dev-1/adapter-instance")
        .header("content-type", "application/json")
        .body(json_body(
            serde_json::json!({ "adapter-instance-id": "adapter-B" }),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn get_adapter_instances_resolves_via_query_param() {
    let (app, store) = test_app();
    store.seed("ai@@T1@@gw-1", "adapter-A");

    let request = Request::builder()
        .method(Method::GET)
        .uri("/tenants/T1/devices/dev-1/adapter-instances?via=gw-1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["adapter-instances"][0]["device-id"], "gw-1");
    assert_eq!(parsed["adapter-instances"][0]["adapter-instance-id"], "adapter-A");
}

#[tokio::test]
async fn readiness_reports_healthy_with_no_registered_probes_under_any_strategy() {
    // With the default `All` strategy and zero registered probes, readiness
    // should report unhealthy: there is nothing to attest the service is ready.
    let (app, _store) = test_app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/_readiness")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn liveness_always_reports_ok() {
    let (app, _store) = test_app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/_liveness")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rejects_invalid_gateway_id_with_400() {
    let (app, _store) = test_app();
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/tenants/T1/devices/dev-1/gateway")
        .header("content-type", "application/json")
        .body(json_body(serde_json::json!({ "gateway-id": "" })))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

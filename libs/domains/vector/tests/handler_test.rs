use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use domain_vector::{EngineConfig, InMemoryStore, ReadinessGate, RecordStore, VectorService, router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn ready_gate() -> Arc<ReadinessGate> {
    let gate = ReadinessGate::new();
    gate.begin_registration().unwrap();
    gate.registration_acknowledged().unwrap();
    gate.store_confirmed().unwrap();
    Arc::new(gate)
}

fn app_with_gate(gate: Arc<ReadinessGate>) -> Router {
    let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
    router(Arc::new(VectorService::new(store, gate, EngineConfig::default())))
}

fn app() -> Router {
    app_with_gate(ready_gate())
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn seed(app: &Router) {
    let (status, _) = call(
        app,
        "POST",
        "/insert",
        Some(json!({"data": [
            ["far", [10.0, 10.0]],
            ["near", [1.0, 1.0]],
            ["mid", [3.0, 3.0]]
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_insert_envelope() {
    let app = app();
    let (status, body) = call(
        &app,
        "POST",
        "/insert",
        Some(json!({"data": [["a", [0.1, 0.2]], ["b", [0.3, 0.4]]]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["inserted_count"], 2);
}

#[tokio::test]
async fn test_search_top_k() {
    let app = app();
    seed(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        "/search",
        Some(json!({"vectors": [[0.0, 0.0]], "measure_type": "l2", "count": 2})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    let hits = body["result"][0].as_array().unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0][0], "near");
    assert_eq!(hits[1][0], "mid");
    assert!(hits[0][1].as_f64().unwrap() > hits[1][1].as_f64().unwrap());
}

#[tokio::test]
async fn test_search_empty_collection() {
    let app = app();
    let (status, body) = call(&app, "POST", "/search", Some(json!({"vectors": [[1.0], [2.0]]}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!([[], []]));
}

#[tokio::test]
async fn test_dimension_mismatch_is_400() {
    let app = app();
    seed(&app).await;

    let (status, body) = call(&app, "POST", "/insert", Some(json!({"data": [["x", [1.0]]]}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn test_unknown_metric_is_400() {
    let app = app();
    let (status, body) = call(
        &app,
        "POST",
        "/search",
        Some(json!({"vectors": [[1.0]], "measure_type": "hamming"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("hamming"));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = app();
    seed(&app).await;

    let ids = json!({"ids": ["near", "mid", "unknown"]});
    let (_, first) = call(&app, "POST", "/delete", Some(ids.clone())).await;
    let (_, second) = call(&app, "POST", "/delete", Some(ids)).await;
    assert_eq!(first["deleted_count"], 2);
    assert_eq!(second["deleted_count"], 0);

    let (_, body) = call(&app, "POST", "/search", Some(json!({"vectors": [[0.0, 0.0]]}))).await;
    let ids: Vec<&str> = body["result"][0]
        .as_array()
        .unwrap()
        .iter()
        .map(|hit| hit[0].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["far"]);
}

#[tokio::test]
async fn test_drop_empties_collection() {
    let app = app();
    seed(&app).await;

    let (status, body) = call(&app, "POST", "/drop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_count"], 3);

    let (_, body) = call(&app, "POST", "/search", Some(json!({"vectors": [[0.0, 0.0]]}))).await;
    assert_eq!(body["result"], json!([[]]));
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/insert")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "INVALID_JSON");
}

#[tokio::test]
async fn test_wrong_shape_is_422() {
    let app = app();
    let (status, body) = call(&app, "POST", "/insert", Some(json!({"data": "nope"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_unready_rejects_with_503() {
    let app = app_with_gate(Arc::new(ReadinessGate::new()));

    for uri in ["/insert", "/search", "/delete"] {
        let body = match uri {
            "/insert" => json!({"data": [["a", [1.0]]]}),
            "/search" => json!({"vectors": [[1.0]]}),
            _ => json!({"ids": ["a"]}),
        };
        let (status, body) = call(&app, "POST", uri, Some(body)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_eq!(body["error"], "SERVICE_UNAVAILABLE");
    }
}

#[tokio::test]
async fn test_ready_endpoint() {
    let (status, body) = call(&app(), "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ready", "gate": "ready", "store": "connected"}));

    let gate = Arc::new(ReadinessGate::new());
    gate.begin_registration().unwrap();
    let (status, body) = call(&app_with_gate(gate), "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not ready");
    assert_eq!(body["gate"], "registering");
}

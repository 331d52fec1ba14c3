//! Route-level tests: the router driven through `oneshot` against an
//! in-memory history store and a local origin server.

use axum::{
    body::Body,
    extract::Path,
    http::{Request, StatusCode},
    routing::{any, get},
    Json, Router,
};
use http_body_util::BodyExt;
use http_history_app::{
    history::{NewRecord, SharedStore},
    router, AppState, HttpMethod, HttpProxyService, RequestExecutor, SqliteHistoryStore,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt; // For `oneshot`

async fn spawn_origin() -> SocketAddr {
    spawn_origin_counting(Arc::new(AtomicUsize::new(0))).await
}

/// Origin server; `hits` counts calls to `/slow`.
async fn spawn_origin_counting(hits: Arc<AtomicUsize>) -> SocketAddr {
    let app = Router::new()
        .route(
            "/status/:code",
            any(|Path(code): Path<u16>| async move {
                let status = StatusCode::from_u16(code).unwrap_or(StatusCode::OK);
                (status, Json(json!({ "status": code })))
            }),
        )
        .route(
            "/slow",
            get(move || {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    Json(json!({ "slow": true }))
                }
            }),
        );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn test_app() -> (Router, SharedStore) {
    let store: SharedStore = Arc::new(SqliteHistoryStore::open_in_memory().unwrap());
    let proxy = HttpProxyService::new(Duration::from_secs(2)).unwrap();
    let executor = RequestExecutor::new(Arc::new(proxy), store.clone());
    (router(AppState::new(executor, store.clone())), store)
}

async fn send(app: &Router, payload: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri("/api/requests/send")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    call(app, request).await
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    call(app, request).await
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn seed(store: &SharedStore, method: HttpMethod, url: &str) -> i64 {
    store
        .append(NewRecord {
            method,
            url: url.to_string(),
            headers: HashMap::new(),
            request_body: None,
            response_status: 200,
            response_time_ms: 5,
            response_size_bytes: Some(2),
            response_body: json!({}),
        })
        .unwrap()
        .id
}

fn history_len(store: &SharedStore) -> u64 {
    store
        .query(&http_history_app::HistoryFilter::new(1, 100))
        .unwrap()
        .total_count
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app();
    let (status, body) = get_json(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_send_rejects_missing_url() {
    let (app, store) = test_app();
    let (status, body) = send(&app, json!({ "method": "GET" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "URL is required");

    let (status, body) = send(&app, json!({ "method": "GET", "url": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "URL is required");
    assert_eq!(history_len(&store), 0);
}

#[tokio::test]
async fn test_send_rejects_malformed_url() {
    let (app, store) = test_app();
    let (status, body) = send(&app, json!({ "method": "GET", "url": "not a url" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid URL format");
    assert_eq!(history_len(&store), 0);
}

#[tokio::test]
async fn test_send_rejects_invalid_method() {
    let (app, store) = test_app();
    for method in [json!("PATCH"), json!("TRACE"), Value::Null] {
        let (status, body) = send(&app, json!({ "method": method, "url": "http://a.test" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid HTTP method");
    }
    assert_eq!(history_len(&store), 0);
}

#[tokio::test]
async fn test_send_proxies_and_records() {
    let addr = spawn_origin().await;
    let (app, store) = test_app();
    let url = format!("http://{}/status/200", addr);

    let (status, body) = send(&app, json!({ "method": "GET", "url": url, "body": {"x": 1} })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], 200);
    assert_eq!(body["data"], json!({"status": 200}));
    assert_eq!(body["responseSize"], 14);
    assert!(body["responseTime"].is_u64());
    assert!(body["headers"]["content-type"].is_string());

    let id = body["id"].as_i64().unwrap();
    let (status, record) = get_json(&app, &format!("/api/history/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["url"], url);
    assert_eq!(record["method"], "GET");
    assert_eq!(record["responseStatus"], 200);
    assert_eq!(record["responseSizeBytes"], 14);
    assert!(record.get("requestBody").is_none());
    assert_eq!(history_len(&store), 1);
}

#[tokio::test]
async fn test_remote_error_status_still_returns_200() {
    let addr = spawn_origin().await;
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        json!({ "method": "DELETE", "url": format!("http://{}/status/404", addr) }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_bare_host_is_prefixed_before_dispatch() {
    let addr = spawn_origin().await;
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        json!({ "method": "GET", "url": format!("{}/status/201", addr) }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["status"], 201);

    let (_, record) = get_json(&app, &format!("/api/history/{}", body["id"])).await;
    assert_eq!(record["url"], format!("http://{}/status/201", addr));
}

#[tokio::test]
async fn test_transport_failure_is_500_and_recorded() {
    let closed = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let (app, store) = test_app();

    let (status, body) = send(
        &app,
        json!({ "method": "POST", "url": format!("http://{}/x", closed), "body": {"a": 1} }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    assert!(body["responseTime"].is_u64());
    assert!(body.get("status").is_none());

    let (_, record) = get_json(&app, &format!("/api/history/{}", body["id"])).await;
    assert_eq!(record["responseStatus"], 500);
    assert!(record.get("responseSizeBytes").is_none());
    assert_eq!(record["requestBody"], json!({"a": 1}));
    assert_eq!(history_len(&store), 1);
}

#[tokio::test]
async fn test_history_pagination() {
    let (app, store) = test_app();
    for i in 0..7 {
        seed(&store, HttpMethod::Get, &format!("http://api.test/items/{}", i));
    }

    let (status, body) = get_json(&app, "/api/history?page=2&limit=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requests"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["pagination"],
        json!({ "page": 2, "limit": 5, "totalItems": 7, "totalPages": 2 })
    );
    assert_eq!(body["requests"][0]["url"], "http://api.test/items/1");
}

#[tokio::test]
async fn test_history_defaults_to_first_ten() {
    let (app, store) = test_app();
    for i in 0..11 {
        seed(&store, HttpMethod::Get, &format!("http://api.test/{}", i));
    }

    let (_, body) = get_json(&app, "/api/history").await;
    let requests = body["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 10);
    assert_eq!(requests[0]["url"], "http://api.test/10");
    assert_eq!(body["pagination"]["totalPages"], 2);
}

#[tokio::test]
async fn test_history_filters() {
    let (app, store) = test_app();
    seed(&store, HttpMethod::Post, "http://api.test/users");
    seed(&store, HttpMethod::Get, "http://api.test/users");
    seed(&store, HttpMethod::Post, "http://api.test/orders");

    let (_, body) = get_json(&app, "/api/history?method=POST").await;
    assert_eq!(body["pagination"]["totalItems"], 2);
    assert!(body["requests"]
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["method"] == "POST"));

    let (_, body) = get_json(&app, "/api/history?method=POST&search=users").await;
    assert_eq!(body["pagination"]["totalItems"], 1);
    assert_eq!(body["requests"][0]["url"], "http://api.test/users");

    let (_, body) = get_json(&app, "/api/history?search=&method=").await;
    assert_eq!(body["pagination"]["totalItems"], 3);
}

#[tokio::test]
async fn test_history_item_not_found() {
    let (app, _) = test_app();
    for uri in ["/api/history/42", "/api/history/abc"] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Request not found");
    }
}

#[tokio::test]
async fn test_caller_disconnect_still_records_attempt() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn_origin_counting(Arc::clone(&hits)).await;
    let (app, store) = test_app();

    let request = Request::builder()
        .uri("/api/requests/send")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "method": "GET", "url": format!("http://{}/slow", addr) }).to_string(),
        ))
        .unwrap();

    // The caller gives up while the origin is still answering.
    let abandoned = tokio::time::timeout(Duration::from_millis(150), app.clone().oneshot(request)).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(history_len(&store), 1);
}

#[tokio::test]
async fn test_history_method_filter_ignores_case() {
    let (app, store) = test_app();
    seed(&store, HttpMethod::Post, "http://api.test/users");
    seed(&store, HttpMethod::Get, "http://api.test/users");

    let (_, body) = get_json(&app, "/api/history?method=post").await;
    assert_eq!(body["pagination"]["totalItems"], 1);
    assert_eq!(body["requests"][0]["method"], "POST");
}

#[tokio::test]
async fn test_send_rejects_malformed_payload_as_json() {
    let (app, store) = test_app();

    let (status, body) = send(
        &app,
        json!({ "method": "GET", "url": "http://a.test", "headers": { "X-N": 1 } }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));

    let (status, body) = send(&app, json!({ "method": "GET", "url": 42 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let request = Request::builder()
        .uri("/api/requests/send")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert_eq!(history_len(&store), 0);
}

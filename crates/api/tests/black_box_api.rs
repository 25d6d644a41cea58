use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use crudline_api::app::services::{AppServices, CustomerMapper};
use crudline_core::Record;
use crudline_infra::{
    cache::{CachePassthrough, InMemoryCache},
    store::{Dialect, Statement, Store, StoreError},
};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with_cache(Arc::new(InMemoryCache::new())).await
    }

    async fn spawn_with_cache(cache: Arc<InMemoryCache>) -> Self {
        let services = AppServices::in_memory(cache, "test")
            .await
            .expect("failed to build in-memory services");
        Self::spawn_services(services, Duration::from_secs(5)).await
    }

    async fn spawn_services(services: AppServices, timeout: Duration) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = crudline_api::app::build_app(Arc::new(services), timeout);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn list(client: &reqwest::Client, srv: &TestServer, path: &str) -> Vec<serde_json::Value> {
    let res = client.get(srv.url(path)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn customer_lifecycle_create_list_update_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Create
    let res = client
        .post(srv.url("/customer"))
        .json(&json!({ "name": "Ada" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["location"], "/customer/1");
    let body: String = res.json().await.unwrap();
    assert_eq!(body, "Customer added successfully");

    // List
    let items = list(&client, &srv, "/customer").await;
    assert_eq!(items, vec![json!({ "id": 1, "name": "Ada" })]);

    // Update
    let res = client
        .put(srv.url("/customer/1"))
        .json(&json!({ "name": "Lovelace" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: String = res.json().await.unwrap();
    assert_eq!(body, "Customer updated successfully");

    // Read one
    let res = client.get(srv.url("/customer/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let customer: serde_json::Value = res.json().await.unwrap();
    assert_eq!(customer, json!({ "id": 1, "name": "Lovelace" }));

    // Delete
    let res = client.delete(srv.url("/customer/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: String = res.json().await.unwrap();
    assert_eq!(body, "Customer deleted successfully");

    // Gone
    let res = client.get(srv.url("/customer/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "not_found");
}

#[tokio::test]
async fn create_from_path_form_and_json_are_all_listed() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.post(srv.url("/customer/Grace")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(srv.url("/customer"))
        .form(&[("name", "Edsger")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(srv.url("/customer"))
        .json(&json!({ "name": "Barbara" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // `/customers` is the same listing as `/customer`.
    let singular = list(&client, &srv, "/customer").await;
    let plural = list(&client, &srv, "/customers").await;
    assert_eq!(singular, plural);

    let names: Vec<&str> = singular.iter().map(|c| c["name"].as_str().unwrap()).collect();
    for name in ["Grace", "Edsger", "Barbara"] {
        assert!(names.contains(&name), "{name} missing from {names:?}");
    }
}

#[tokio::test]
async fn form_content_type_is_matched_case_insensitively() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/customer"))
        .header("content-type", "Application/X-WWW-Form-Urlencoded; charset=UTF-8")
        .body("name=Ada")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let items = list(&client, &srv, "/customer").await;
    assert_eq!(items, vec![json!({ "id": 1, "name": "Ada" })]);
}

#[tokio::test]
async fn empty_list_is_a_json_array() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    assert!(list(&client, &srv, "/customer").await.is_empty());
}

#[tokio::test]
async fn missing_or_empty_name_is_rejected_without_a_write() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for body in [json!({ "name": "" }), json!({ "name": "   " }), json!({})] {
        let res = client.post(srv.url("/customer")).json(&body).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {body}");
        let err: serde_json::Value = res.json().await.unwrap();
        assert_eq!(err["error"], "invalid_input");
    }

    assert!(list(&client, &srv, "/customer").await.is_empty());
}

#[tokio::test]
async fn malformed_bodies_are_invalid_input() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/customer"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/customer"))
        .header("content-type", "text/plain")
        .body("name=Ada")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .put(srv.url("/customer/1"))
        .json(&json!({ "name": 42 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_numeric_id_is_invalid_input() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/customer/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.delete(srv.url("/customer/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_of_unknown_id_succeeds_silently() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/customer/999"))
        .json(&json!({ "name": "Nobody" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Nothing was created as a side effect.
    assert!(list(&client, &srv, "/customer").await.is_empty());
}

#[tokio::test]
async fn delete_twice_does_not_error() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    client.post(srv.url("/customer/Ada")).send().await.unwrap();

    for _ in 0..2 {
        let res = client.delete(srv.url("/customer/1")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn cache_passthrough_returns_value_or_empty() {
    let cache = Arc::new(InMemoryCache::new());
    let srv = TestServer::spawn_with_cache(cache.clone()).await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/redis")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let value: String = res.json().await.unwrap();
    assert_eq!(value, "");

    cache.insert("test", "hello").unwrap();
    let value: String = client.get(srv.url("/redis")).send().await.unwrap().json().await.unwrap();
    assert_eq!(value, "hello");
}

#[tokio::test]
async fn health_endpoints_report_up() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/.well-known/alive")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/.well-known/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "UP", "store": "UP", "cache": "UP" }));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/customer")).send().await.unwrap();
    let id = res.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid_like(id), "unexpected request id {id}");
}

fn uuid_like(s: &str) -> bool {
    s.len() == 36 && s.chars().filter(|c| *c == '-').count() == 4
}

/// Store whose reads never finish; records when the pending call is dropped.
#[derive(Default)]
struct StalledStore {
    abandoned: Arc<AtomicBool>,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for StalledStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn execute(&self, _statement: &Statement) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn query(&self, _statement: &Statement) -> Result<Vec<Record>, StoreError> {
        let _flag = DropFlag(self.abandoned.clone());
        std::future::pending::<()>().await;
        Ok(Vec::new())
    }

    async fn query_one(&self, _statement: &Statement) -> Result<Option<Record>, StoreError> {
        Ok(None)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[tokio::test]
async fn request_deadline_abandons_in_flight_store_call() {
    let store = Arc::new(StalledStore::default());
    let abandoned = store.abandoned.clone();
    let services = AppServices::new(
        CustomerMapper::new(store),
        CachePassthrough::new(Arc::new(InMemoryCache::new()), "test"),
    );
    let srv = TestServer::spawn_services(services, Duration::from_millis(100)).await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/customer")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "timeout");
    assert!(abandoned.load(Ordering::SeqCst));
}

use std::sync::Arc;

use gridcat_api::app::{build_app, services::AppServices};
use gridcat_api::config::AppConfig;
use gridcat_events::{EventBus, Subscription};
use gridcat_resources::{ResourceEvent, ResourceTopics};
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    changes: Subscription<ResourceEvent>,
    bulk: Subscription<ResourceEvent>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store and bus, ephemeral port.
        let services = Arc::new(AppServices::in_memory(&AppConfig::default()));
        let bus = services.local_bus().expect("in-memory services expose their bus");
        let topics = ResourceTopics::default();
        let changes = bus.subscribe(&topics.single_change);
        let bulk = bus.subscribe(&topics.bulk);

        let app = build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            changes,
            bulk,
            handle,
        }
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

fn metering_point() -> Value {
    json!({
        "resourceType": "METERING_POINT",
        "countryCode": "EE",
        "location": {
            "streetAddress": "Rand tee 1",
            "city": "Tallinn",
            "postalCode": 10001,
            "countryCode": "EE"
        },
        "characteristics": [
            {"code": "1", "characteristicType": "CONSUMPTION_TYPE", "characteristicValue": "220"}
        ]
    })
}

async fn add(client: &reqwest::Client, srv: &TestServer, body: &Value) -> Value {
    let res = client
        .post(srv.url("/resources/add"))
        .json(body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["data"][0].clone()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn add_assigns_ids_and_publishes_one_change_event() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let saved = add(&client, &srv, &metering_point()).await;

    assert!(saved["id"].is_i64());
    assert!(saved["location"]["id"].is_i64());
    assert!(saved["characteristics"][0]["id"].is_i64());
    assert_eq!(saved["location"]["city"], "Tallinn");
    assert_eq!(saved["characteristics"][0]["characteristicType"], "CONSUMPTION_TYPE");

    let events = srv.changes.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(serde_json::to_value(events[0].resource()).unwrap(), saved);
    assert!(srv.bulk.drain().is_empty());
}

#[tokio::test]
async fn get_returns_what_add_returned() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let saved = add(&client, &srv, &metering_point()).await;
    let res = client
        .get(srv.url(&format!("/resources/{}", saved["id"])))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "data": [saved] }));
    assert_eq!(srv.changes.drain().len(), 1);
}

#[tokio::test]
async fn missing_resource_is_404_with_message() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/resources/42")).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "errors": ["Resource with id 42 not found"] }));
}

#[tokio::test]
async fn non_numeric_id_is_400() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/resources/abc")).await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "errors": ["Invalid value for parameter 'id': 'abc'"] }));
}

#[tokio::test]
async fn validation_failures_are_400_and_publish_nothing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/resources/add"))
        .json(&json!({
            "countryCode": "EE",
            "characteristics": [{"code": "TOOLONG", "characteristicType": "CONSUMPTION_TYPE"}]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "errors": ["ResourceType cannot be null", "Code must be at most 5 characters"] })
    );
    assert!(srv.changes.drain().is_empty());
}

#[tokio::test]
async fn malformed_json_is_400() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/resources/add"))
        .header("content-type", "application/json")
        .body("{\"resourceType\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn put_replaces_and_publishes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let saved = add(&client, &srv, &metering_point()).await;
    srv.changes.drain();

    let res = client
        .put(srv.url(&format!("/resources/{}", saved["id"])))
        .json(&json!({ "resourceType": "CONNECTION_POINT", "countryCode": "FI" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let replaced = &body["data"][0];
    assert_eq!(replaced["id"], saved["id"]);
    assert_eq!(replaced["resourceType"], "CONNECTION_POINT");
    assert_eq!(replaced["countryCode"], "FI");
    assert!(replaced["location"].is_null());
    assert_eq!(replaced["characteristics"], json!([]));

    let events = srv.changes.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(&serde_json::to_value(events[0].resource()).unwrap(), replaced);
}

#[tokio::test]
async fn put_on_unknown_id_is_404() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/resources/7"))
        .json(&json!({ "resourceType": "CONNECTION_POINT" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(srv.changes.drain().is_empty());
}

#[tokio::test]
async fn patch_merges_present_fields_without_publishing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let saved = add(&client, &srv, &metering_point()).await;
    srv.changes.drain();

    let res = client
        .patch(srv.url(&format!("/resources/{}", saved["id"])))
        .json(&json!({ "countryCode": "LV" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let patched = &body["data"][0];
    assert_eq!(patched["countryCode"], "LV");
    assert_eq!(patched["resourceType"], saved["resourceType"]);
    assert_eq!(patched["location"], saved["location"]);
    assert_eq!(patched["characteristics"], saved["characteristics"]);

    assert!(srv.changes.drain().is_empty());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let saved = add(&client, &srv, &metering_point()).await;
    let path = srv.url(&format!("/resources/{}", saved["id"]));

    for _ in 0..2 {
        let res = client.delete(&path).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client.get(&path).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inject_then_send_all_republishes_everything() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/inject")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(srv.changes.drain().len(), 3);

    let res = client.get(srv.url("/resources/sendAll")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Send 3 items from Resource.");

    let bulk = srv.bulk.drain();
    assert_eq!(bulk.len(), 3);
    let cities: Vec<_> = bulk
        .iter()
        .filter_map(|e| e.resource().location.as_ref()?.city.clone())
        .collect();
    assert!(cities.contains(&"Helsinki".to_string()));
    assert!(srv.changes.drain().is_empty());
}

#[tokio::test]
async fn unknown_enum_value_is_400() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/resources/add"))
        .json(&json!({ "resourceType": "SUBSTATION" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(srv.changes.drain().is_empty());
}

#[tokio::test]
async fn null_characteristics_on_add_are_an_empty_list() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let saved = add(
        &client,
        &srv,
        &json!({ "resourceType": "CONNECTION_POINT", "characteristics": null }),
    )
    .await;

    assert_eq!(saved["characteristics"], json!([]));
    assert_eq!(srv.changes.drain().len(), 1);
}

#[tokio::test]
async fn null_code_on_put_is_a_validation_message() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let saved = add(&client, &srv, &metering_point()).await;
    srv.changes.drain();

    let res = client
        .put(srv.url(&format!("/resources/{}", saved["id"])))
        .json(&json!({
            "resourceType": "METERING_POINT",
            "characteristics": [{"code": null, "characteristicType": "CHARGING_POINT"}]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "errors": ["Code is required field."] }));
    assert!(srv.changes.drain().is_empty());
}

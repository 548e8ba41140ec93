//! Runs against a MongoDB listening on localhost:27017.
//! Use `cargo test -- --ignored` with a local server available.

mod common;

use common::{test_config, TestApp};
use records_service::config::{MongoConfig, StoreBackend};
use records_service::services::{MongoRecordStore, RecordStore};
use secrecy::Secret;
use serde_json::json;

async fn drop_database(config: &MongoConfig) {
    let store = MongoRecordStore::connect(config)
        .await
        .expect("Failed to build MongoDB client");
    let _ = store.database().drop(None).await;
}

#[tokio::test]
#[ignore = "Requires MongoDB on localhost:27017"]
async fn mongodb_round_trip() {
    let config = test_config(StoreBackend::Mongodb);
    let mongo = config.mongodb.clone();
    let app = TestApp::spawn_with_config(config).await;

    assert_eq!(app.records().await, Vec::<serde_json::Value>::new());

    for value in ["", "x", "42"] {
        let response = app.post_form(&format!("data={}", value)).await;
        assert_eq!(response.status().as_u16(), 200);
    }
    let response = app.post_json(&json!({ "data": [1, "two", { "three": 3 }] })).await;
    assert_eq!(response.status().as_u16(), 200);

    let records = app.records().await;
    let values: Vec<_> = records.iter().map(|r| r["data"].clone()).collect();
    assert_eq!(
        values,
        vec![json!(""), json!("x"), json!("42"), json!([1, "two", { "three": 3 }])]
    );

    drop_database(&mongo).await;
}

#[tokio::test]
#[ignore = "Requires MongoDB on localhost:27017"]
async fn mongodb_store_inserts_and_lists() {
    let config = test_config(StoreBackend::Mongodb);
    let store = MongoRecordStore::connect(&config.mongodb)
        .await
        .expect("Failed to build MongoDB client");

    store.health_check().await.expect("MongoDB not reachable");
    let inserted = store.insert(json!("hello")).await.unwrap();

    let records = store.list().await.unwrap();
    assert_eq!(records, vec![inserted]);

    let _ = store.database().drop(None).await;
}

#[tokio::test]
async fn unreachable_mongodb_fails_fast_with_503() {
    let mut config = test_config(StoreBackend::Mongodb);
    // Nothing listens on port 1; server selection gives up after the timeout
    config.mongodb.uri = Secret::new("mongodb://127.0.0.1:1/?connectTimeoutMS=200".to_string());
    config.mongodb.server_selection_timeout_secs = 1;
    let app = TestApp::spawn_with_config(config).await;

    let root = app.client.get(&app.address).send().await.unwrap();
    assert_eq!(root.status().as_u16(), 200);

    let response = app.get_data().await;
    assert_eq!(response.status().as_u16(), 503);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let response = app.post_form("data=x").await;
    assert_eq!(response.status().as_u16(), 503);
}

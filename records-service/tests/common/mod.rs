#![allow(dead_code)]

use records_service::config::{
    CorsConfig, HttpConfig, MongoConfig, RecordsConfig, StoreBackend, StoreConfig,
};
use records_service::models::Record;
use records_service::services::{InMemoryRecordStore, RecordStore};
use records_service::startup::Application;
use secrecy::Secret;
use serde_json::Value;
use async_trait::async_trait;
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;
use std::sync::Arc;

pub fn test_config(backend: StoreBackend) -> RecordsConfig {
    RecordsConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            log_level: "info".to_string(),
            otlp_endpoint: None,
        },
        mongodb: MongoConfig {
            uri: Secret::new("mongodb://localhost:27017".to_string()),
            database: format!("records_test_{}", uuid::Uuid::new_v4().simple()),
            collection: "records".to_string(),
            server_selection_timeout_secs: 2,
        },
        store: StoreConfig { backend },
        cors: CorsConfig {
            allowed_origin: "*".to_string(),
        },
        http: HttpConfig {
            request_timeout_secs: 10,
        },
    }
}

/// Store whose every operation fails as if the server were unreachable.
pub struct UnreachableStore;

#[async_trait]
impl RecordStore for UnreachableStore {
    async fn list(&self) -> Result<Vec<Record>, AppError> {
        Err(AppError::ServiceUnavailable(anyhow::anyhow!(
            "Server selection timeout: No available servers"
        )))
    }

    async fn insert(&self, _data: Value) -> Result<Record, AppError> {
        Err(AppError::ServiceUnavailable(anyhow::anyhow!(
            "Server selection timeout: No available servers"
        )))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Err(AppError::ServiceUnavailable(anyhow::anyhow!(
            "Server selection timeout: No available servers"
        )))
    }
}

/// Store that accepts the call and then never answers within a test's deadline.
pub struct StalledStore;

#[async_trait]
impl RecordStore for StalledStore {
    async fn list(&self) -> Result<Vec<Record>, AppError> {
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        Ok(Vec::new())
    }

    async fn insert(&self, data: Value) -> Result<Record, AppError> {
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        Ok(Record::new(data))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<dyn RecordStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(InMemoryRecordStore::new())).await
    }

    pub async fn spawn_with_store(store: Arc<dyn RecordStore>) -> Self {
        let config = test_config(StoreBackend::Memory);
        let app = Application::with_store(config, store)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    pub async fn spawn_with_config(config: RecordsConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    async fn start(app: Application) -> Self {
        let port = app.port();
        let store = app.store();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            client,
        }
    }

    pub async fn post_form(&self, body: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/post-data", self.address))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body.to_string())
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/post-data", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_data(&self) -> reqwest::Response {
        self.client
            .get(format!("{}/get-data", self.address))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn records(&self) -> Vec<Value> {
        let response = self.get_data().await;
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.expect("Failed to parse JSON")
    }
}

use crate::config::MongoConfig;
use crate::models::Record;
use crate::services::store::RecordStore;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, Document},
    options::ClientOptions,
    Client as MongoClient, Collection, Database,
};
use secrecy::ExposeSecret;
use serde_json::Value;
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoRecordStore {
    client: MongoClient,
    db: Database,
    collection: String,
}

impl MongoRecordStore {
    /// Builds the process-wide client. The driver connects lazily and pools
    /// connections, so an unreachable server surfaces on the first operation.
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "Connecting to MongoDB"
        );

        let mut options = ClientOptions::parse(config.uri.expose_secret())
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse MongoDB connection string: {}", e);
                AppError::ConfigError(anyhow::anyhow!("Invalid MONGODB_URI: {}", e))
            })?;
        options.app_name = Some("records-service".to_string());
        options.server_selection_timeout = Some(config.server_selection_timeout());

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(&config.database);

        tracing::info!(database = %config.database, "MongoDB client ready");
        Ok(Self {
            client,
            db,
            collection: config.collection.clone(),
        })
    }

    pub fn records(&self) -> Collection<Document> {
        self.db.collection(&self.collection)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn list(&self) -> Result<Vec<Record>, AppError> {
        let cursor = self.records().find(None, None).await.map_err(|e| {
            tracing::error!(collection = %self.collection, "Failed to query records: {}", e);
            AppError::from(e)
        })?;

        let documents: Vec<Document> = cursor.try_collect().await.map_err(|e| {
            tracing::error!(collection = %self.collection, "Failed to collect records: {}", e);
            AppError::from(e)
        })?;

        Ok(documents.into_iter().map(Record::from_document).collect())
    }

    async fn insert(&self, data: Value) -> Result<Record, AppError> {
        let value = bson::to_bson(&data).map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("data cannot be stored: {}", e))
        })?;

        let result = self
            .records()
            .insert_one(doc! { "data": value }, None)
            .await
            .map_err(|e| {
                tracing::error!(collection = %self.collection, "Failed to insert record: {}", e);
                AppError::from(e)
            })?;

        let id = match result.inserted_id {
            bson::Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        };
        tracing::debug!(record_id = %id, "Inserted record");

        Ok(Record { id, data })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}

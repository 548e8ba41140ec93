use crate::models::Record;
use crate::services::store::RecordStore;
use async_trait::async_trait;
use serde_json::Value;
use service_core::error::AppError;
use tokio::sync::RwLock;

/// Process-local backend. Records live as long as the process.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Vec<Record>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list(&self) -> Result<Vec<Record>, AppError> {
        Ok(self.records.read().await.clone())
    }

    async fn insert(&self, data: Value) -> Result<Record, AppError> {
        let record = Record::new(data);
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

use crate::models::Record;
use async_trait::async_trait;
use serde_json::Value;
use service_core::error::AppError;

/// Gateway to the record collection. Implementations are shared across
/// requests behind an `Arc`, so they own whatever pooling they need.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record in the collection, in the store's default cursor order.
    async fn list(&self) -> Result<Vec<Record>, AppError>;

    /// Inserts one record holding `data` and returns it with its generated id.
    async fn insert(&self, data: Value) -> Result<Record, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

use crate::models::{NewRecord, Record};
use crate::startup::AppState;
use axum::{extract::State, Json};
use metrics::counter;
use service_core::error::AppError;

pub const INSERT_ACK: &str = "Data added";

#[tracing::instrument(skip(state))]
pub async fn get_data(State(state): State<AppState>) -> Result<Json<Vec<Record>>, AppError> {
    let records = state.store.list().await?;

    counter!("records_listed_total").increment(records.len() as u64);
    tracing::info!(count = records.len(), "Listed records");

    Ok(Json(records))
}

#[tracing::instrument(skip(state, payload))]
pub async fn post_data(
    State(state): State<AppState>,
    payload: NewRecord,
) -> Result<&'static str, AppError> {
    let record = state.store.insert(payload.data).await?;

    counter!("records_inserted_total").increment(1);
    tracing::info!(record_id = %record.id, "Record added");

    Ok(INSERT_ACK)
}

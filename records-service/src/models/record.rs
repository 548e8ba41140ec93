use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header,
    Form, Json,
};
use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::error::AppError;
use validator::Validate;

/// A stored document: the client supplied `data` plus the store generated id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    #[serde(rename = "_id")]
    pub id: String,
    pub data: Value,
}

impl Record {
    pub fn new(data: Value) -> Self {
        Self {
            id: ObjectId::new().to_hex(),
            data,
        }
    }

    /// Converts a raw collection document. Documents without `data` read back as `null`.
    pub fn from_document(document: Document) -> Self {
        let id = match document.get("_id") {
            Some(Bson::ObjectId(oid)) => oid.to_hex(),
            Some(Bson::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let data = document
            .get("data")
            .cloned()
            .map(Bson::into_relaxed_extjson)
            .unwrap_or(Value::Null);

        Self { id, data }
    }
}

// JSON `null` deserializes to `None`, so it fails `required` like an absent field.
#[derive(Debug, Deserialize, Validate)]
struct JsonBody {
    #[validate(required(message = "data field is required"))]
    data: Option<Value>,
}

#[derive(Debug, Deserialize, Validate)]
struct FormBody {
    #[validate(required(message = "data field is required"))]
    data: Option<String>,
}

/// Payload of an insert request, accepted as JSON or as a urlencoded form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub data: Value,
}

fn is_json_content_type(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let mime = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

#[async_trait]
impl<S> FromRequest<S> for NewRecord
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let data = if is_json_content_type(&req) {
            let Json(body) = Json::<JsonBody>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e.body_text())))?;
            body.validate()?;
            body.data.unwrap_or_default()
        } else {
            let Form(body) = Form::<FormBody>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e.body_text())))?;
            body.validate()?;
            body.data.map(Value::String).unwrap_or_default()
        };

        Ok(NewRecord { data })
    }
}

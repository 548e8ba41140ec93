//! Cross-origin header policy.
//!
//! `tower_http`'s [`CorsLayer`] only emits `Access-Control-Allow-Headers` on
//! preflight responses, so the allow-list is also stamped onto every other
//! response with a [`SetResponseHeaderLayer`].

use crate::error::AppError;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

pub const ALLOWED_REQUEST_HEADERS: [HeaderName; 4] = [
    header::ORIGIN,
    HeaderName::from_static("x-requested-with"),
    header::CONTENT_TYPE,
    header::ACCEPT,
];

/// Value sent in `Access-Control-Allow-Headers` on non-preflight responses.
pub const ALLOWED_REQUEST_HEADERS_VALUE: &str = "Origin, X-Requested-With, Content-Type, Accept";

/// Builds the CORS layer for `allowed_origin`, where `*` allows any origin.
pub fn cors_layer(allowed_origin: &str) -> Result<CorsLayer, AppError> {
    let origin = if allowed_origin.trim() == "*" {
        AllowOrigin::any()
    } else {
        let value = allowed_origin.trim().parse::<HeaderValue>().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid CORS origin '{}': {}",
                allowed_origin,
                e
            ))
        })?;
        AllowOrigin::list([value])
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(ALLOWED_REQUEST_HEADERS))
}

pub fn allow_headers_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_REQUEST_HEADERS_VALUE),
    )
}

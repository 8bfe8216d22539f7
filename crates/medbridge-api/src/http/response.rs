//! Success envelope for REST responses.
//!
//! ```json
//! {
//!   "data": { ... },
//!   "meta": { "request_id": "...", "timestamp": "...", "response_time_ms": 5 }
//! }
//! ```
//!
//! Failures use the same `meta` block with an `errors` array instead of
//! `data`; see `AppError`.

use std::time::Instant;

use axum::Json;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ApiMeta,
}

#[derive(Debug, Serialize)]
pub struct ApiMeta {
    pub request_id: String,
    /// RFC 3339.
    pub timestamp: String,
    pub response_time_ms: u64,
}

/// Started when a handler begins; stamps the envelope when it finishes.
pub struct RequestTimer {
    request_id: Uuid,
    started: Instant,
}

impl RequestTimer {
    pub fn start() -> Self {
        Self {
            request_id: Uuid::now_v7(),
            started: Instant::now(),
        }
    }

    pub fn respond<T: Serialize>(self, data: T) -> Json<ApiResponse<T>> {
        Json(ApiResponse {
            data,
            meta: ApiMeta {
                request_id: self.request_id.to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                response_time_ms: self.started.elapsed().as_millis() as u64,
            },
        })
    }
}

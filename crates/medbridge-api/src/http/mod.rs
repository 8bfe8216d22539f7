//! HTTP/REST API layer for MedBridge.
//!
//! Axum-based REST API at `/api/v1/` with an envelope response format and
//! CORS support. Rooms are the only resource.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;

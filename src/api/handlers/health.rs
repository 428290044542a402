//! # Health Check Handler
//!
//! برای بررسی سلامت سرویس

use axum::{extract::State, Json};
use tracing::warn;

use crate::{models::HealthResponse, services::AppState};

// =====================================
// Health Check
// =====================================
/// بررسی سلامت سرویس
///
/// # Endpoint
/// `GET /health`
///
/// # Response
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "store": true
/// }
/// ```
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_ok = match state.store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Store health check failed");
            false
        }
    };

    Json(HealthResponse::from_store_status(store_ok))
}

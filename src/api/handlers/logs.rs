//! # Audit Log Handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::Result,
    models::{ApiResponse, AuditLogEntry},
    services::AppState,
};

/// کل audit log، جدیدترین اول
///
/// # Endpoint
/// `GET /logs`
pub async fn get_logs(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AuditLogEntry>>>> {
    let entries = state.service.get_audit_log().await?;

    Ok(Json(ApiResponse::success(entries)))
}

/// خالی کردن audit log
///
/// # Endpoint
/// `DELETE /logs`
pub async fn clear_logs(State(state): State<AppState>) -> Result<StatusCode> {
    state.service.clear_audit_log().await?;

    Ok(StatusCode::NO_CONTENT)
}

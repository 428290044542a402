//! # Link Handlers
//!
//! CRUD لینک‌های کوتاه و resolve به صورت JSON

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    api::extractors::{JsonBody, Referrer},
    error::Result,
    models::{ApiResponse, CreateLinkRequest, LinkRecord, LinkResponse, ResolveResponse},
    services::AppState,
};

fn to_response(state: &AppState, record: &LinkRecord) -> LinkResponse {
    LinkResponse::from_record(record, &state.config.base_url, state.service.now())
}

// =====================================
// Create Short Link
// =====================================
/// ساخت لینک کوتاه جدید
///
/// # Endpoint
/// `POST /links`
///
/// # Request Body
/// ```json
/// {
///   "longUrl": "https://example.com/long-url",
///   "customCode": "promo",   // optional
///   "validityMins": 5        // optional
/// }
/// ```
///
/// # Response
/// - 201 با لینک ساخته‌شده
/// - 422 ورودی نامعتبر
/// - 409 کد سفارشی تکراری
pub async fn create_link(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateLinkRequest>,
) -> Result<impl IntoResponse> {
    let record = state.service.create_short_link(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(to_response(&state, &record)).with_message("Short link created")),
    ))
}

// =====================================
// List
// =====================================
/// همه لینک‌ها، جدیدترین اول
///
/// # Endpoint
/// `GET /links`
pub async fn list_links(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LinkResponse>>>> {
    let links = state
        .service
        .list_short_links()
        .await?
        .iter()
        .map(|record| to_response(&state, record))
        .collect();

    Ok(Json(ApiResponse::success(links)))
}

// =====================================
// Stats
// =====================================
/// آمار یک لینک (بدون ثبت دسترسی)
///
/// # Endpoint
/// `GET /links/:code`
pub async fn get_link(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<LinkResponse>>> {
    let record = state.service.get_short_link(&code).await?;

    Ok(Json(ApiResponse::success(to_response(&state, &record))))
}

// =====================================
// Resolve
// =====================================
/// Resolve به صورت JSON، برای کلاینت‌هایی که خودشون redirect میکنن
///
/// # Endpoint
/// `POST /links/:code/resolve`
///
/// # Response
/// همیشه 200:
/// `{found: false}`، `{found: false, expired: true}` یا `{found: true, record}`
pub async fn resolve_link(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Referrer(referrer): Referrer,
) -> Result<Json<ResolveResponse>> {
    let outcome = state
        .service
        .resolve_short_link(&code, referrer.as_deref())
        .await?;

    Ok(Json(ResolveResponse::from(outcome)))
}

// =====================================
// Delete
// =====================================
/// حذف لینک؛ برای کد ناموجود هم 204
///
/// # Endpoint
/// `DELETE /links/:code`
pub async fn delete_link(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode> {
    state.service.delete_short_link(&code).await?;

    Ok(StatusCode::NO_CONTENT)
}

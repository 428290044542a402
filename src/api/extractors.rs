//! # Custom Extractors
//!
//! Extractor‌های سفارشی برای استخراج داده از request
//!
//! ## مفاهیم Rust + Axum:
//! - **FromRequestParts**: trait برای extractor‌هایی که به body نیازی ندارن
//! - **Infallible**: extractor‌هایی که هیچوقت reject نمیکنن
//!
//! وقتی یه extractor به عنوان پارامتر handler تعریف میشه،
//! axum قبل از اجرای handler، extractor رو اجرا میکنه.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

// =====================================
// Referrer Extractor
// =====================================
/// استخراج referrer از header `Referer`
///
/// مقدار خالی یا غیر-ASCII معادل نبودن header هست.
///
/// # استفاده در handler:
/// ```rust,ignore
/// async fn handler(Referrer(referrer): Referrer) -> ... {
///     // referrer: Option<String>
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Referrer(pub Option<String>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Referrer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let referrer = parts
            .headers
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);

        Ok(Referrer(referrer))
    }
}

// =====================================
// JSON Body
// =====================================
/// مثل `axum::Json`، ولی خطای parse به شکل `ErrorResponse` خودمون برمیگرده
///
/// # استفاده:
/// ```rust,ignore
/// async fn handler(JsonBody(data): JsonBody<CreateLinkRequest>) -> ... {}
/// ```
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data): Json<T> = Json::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| AppError::BadRequest(format!("Invalid JSON: {}", e)))?;

        Ok(JsonBody(data))
    }
}

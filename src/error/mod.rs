//! # ماژول مدیریت خطاها (Error Handling)
//!
//! این ماژول سیستم مدیریت خطای برنامه رو تعریف میکنه.
//!
//! ## دسته‌بندی خطاها
//!
//! - `Validation`: URL خراب، کد سفارشی نامعتبر یا مدت اعتبار صفر
//! - `Conflict`: کد سفارشی قبلا ثبت شده
//! - خطاهای زیرساخت (store، JSON، IO)
//!
//! پیدا نشدن یا منقضی بودن یک لینک در `resolve` خطا **نیست**؛
//! اون‌ها بخشی از نتیجه عادی (`ResolveOutcome`) هستن و فقط در لایه HTTP
//! به 404 و 410 تبدیل میشن.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

// =====================================
// Result Type Alias
// =====================================
/// نوع Result سفارشی برنامه
///
/// به جای نوشتن `Result<LinkRecord, AppError>` میتونیم بنویسیم `Result<LinkRecord>`
pub type Result<T, E = AppError> = std::result::Result<T, E>;

// =====================================
// Custom Error Enum
// =====================================
/// خطای اصلی برنامه
///
/// # مفاهیم:
/// - `#[derive(Error)]`: از thiserror برای پیاده‌سازی Error trait
/// - `#[from]`: تبدیل خودکار از نوع‌های دیگه با `?`
#[derive(Debug, Error)]
pub enum AppError {
    // ----------------------------------------
    // خطاهای کاربر (4xx)
    // ----------------------------------------

    /// درخواست نامعتبر - 400
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// پیدا نشد - 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// تکراری - 409
    #[error("Conflict: {0}")]
    Conflict(String),

    /// منقضی شده - 410
    #[error("Gone: {0}")]
    Gone(String),

    /// خطای اعتبارسنجی - 422
    #[error("Validation error: {0}")]
    Validation(String),

    // ----------------------------------------
    // خطاهای سرور (5xx)
    // ----------------------------------------

    /// خطای داخلی سرور - 500
    #[error("Internal server error: {0}")]
    Internal(String),

    /// خطای تنظیمات
    #[error("Configuration error: {0}")]
    Config(String),

    // ----------------------------------------
    // خطاهای تبدیل شده از کتابخانه‌ها
    // ----------------------------------------

    /// خطای دیتابیس (backend SQLite)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// خطای اجرای migration
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// خطای IO
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// خطای JSON (سریالایز رکوردها در store)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// گرفتن HTTP status code متناسب با خطا
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Gone(_) => StatusCode::GONE,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,

            // 5xx Server Errors
            Self::Internal(_)
            | Self::Config(_)
            | Self::Database(_)
            | Self::Migration(_)
            | Self::Io(_)
            | Self::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// آیا این یه خطای سرور هست؟
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// ساخت خطای Not Found برای لینک
    #[must_use]
    pub fn link_not_found(code: &str) -> Self {
        Self::NotFound(format!("Short link '{}' not found", code))
    }

    /// ساخت خطای Gone برای لینک منقضی
    #[must_use]
    pub fn link_expired(code: &str) -> Self {
        Self::Gone(format!("Short link '{}' has expired", code))
    }

    /// ساخت خطای Conflict برای کد تکراری
    #[must_use]
    pub fn code_taken(code: &str) -> Self {
        Self::Conflict(format!("Short code '{}' already exists", code))
    }
}

// =====================================
// Error Response DTO
// =====================================
/// ساختار پاسخ خطا در API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// کد خطا (مثلا "Not Found")
    pub error: String,

    /// پیام خطا
    pub message: String,

    /// کد وضعیت HTTP
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ErrorResponse {
    /// ساخت پاسخ خطای جدید
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status_code: None,
        }
    }

    /// اضافه کردن کد وضعیت
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status_code = Some(status.as_u16());
        self
    }
}

// =====================================
// IntoResponse Implementation
// =====================================
/// تبدیل AppError به Response HTTP
///
/// این باعث میشه handler‌ها بتونن مستقیم `Result<_, AppError>` برگردونن.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(error = %self, "Server error occurred");
        }

        let status = self.status_code();

        let error_response = ErrorResponse::new(
            status.canonical_reason().unwrap_or("Error"),
            self.to_string(),
        )
        .with_status(status);

        (status, Json(error_response)).into_response()
    }
}

// =====================================
// From Implementations
// =====================================

// خطای crate `config` فقط موقع لود تنظیمات پیش میاد
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

//! # Data Transfer Objects (DTOs)
//!
//! DTO‌های عمومی که در API استفاده میشن

use serde::{Deserialize, Serialize};

use super::{LinkRecord, ResolveOutcome};

// =====================================
// Generic API Responses
// =====================================
/// پاسخ موفق عمومی
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// ساخت پاسخ موفق
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// اضافه کردن پیام
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// =====================================
// Resolve
// =====================================
/// شکل سیم‌کشی `ResolveOutcome`
///
/// - `{found: false}`
/// - `{found: false, expired: true}`
/// - `{found: true, record: {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub found: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<LinkRecord>,
}

impl From<ResolveOutcome> for ResolveResponse {
    fn from(outcome: ResolveOutcome) -> Self {
        match outcome {
            ResolveOutcome::NotFound => Self {
                found: false,
                expired: None,
                record: None,
            },
            ResolveOutcome::Expired => Self {
                found: false,
                expired: Some(true),
                record: None,
            },
            ResolveOutcome::Found(record) => Self {
                found: true,
                expired: None,
                record: Some(record),
            },
        }
    }
}

// =====================================
// Health Check
// =====================================
/// پاسخ health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: bool,
}

impl HealthResponse {
    /// ساخت پاسخ بر اساس وضعیت store
    #[must_use]
    pub fn from_store_status(store_ok: bool) -> Self {
        Self {
            status: if store_ok { "healthy" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: store_ok,
        }
    }
}

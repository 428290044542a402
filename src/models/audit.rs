//! # مدل Audit Log
//!
//! رکوردهای ساختاریافته‌ای که هر عمل کسب‌وکار ثبت میکنه.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// نوع رویدادهای شناخته‌شده
///
/// `event_type` یه رشته آزاد هست؛ این‌ها مقادیری هستن که خود برنامه ثبت میکنه.
pub mod event_types {
    pub const ACTION_START: &str = "action.start";
    pub const ACTION_SUCCESS: &str = "action.success";
    pub const ACTION_ERROR: &str = "action.error";

    pub const SHORTLINK_CREATED: &str = "shortlink.created";
    pub const SHORTLINK_DELETED: &str = "shortlink.deleted";
    pub const SHORTLINK_ACCESSED: &str = "shortlink.accessed";
    pub const SHORTLINK_EXPIRED: &str = "shortlink.expired";
    pub const SHORTLINK_MISS: &str = "shortlink.miss";
}

/// یک رکورد audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// شناسه یکتا
    pub id: Uuid,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// نوع رویداد (مثلا `shortlink.created`)
    pub event_type: String,

    /// داده ساختاریافته رویداد
    pub payload: Value,
}

impl AuditLogEntry {
    /// ساخت رکورد جدید با UUID تازه
    #[must_use]
    pub fn new(event_type: impl Into<String>, payload: Value, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            event_type: event_type.into(),
            payload,
        }
    }
}

//! # مدل لینک
//!
//! Entity لینک کوتاه، تاریخچه دسترسی و نتیجه resolve

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::HISTORY_DISPLAY_LIMIT;

// =====================================
// Link Record Entity
// =====================================
/// Entity اصلی لینک کوتاه
///
/// # Invariant‌ها:
/// - `code` بعد از ساخت تغییر نمیکنه
/// - `expires_at = created_at + validity_mins` دقیقه
/// - `clicks` هیچوقت کم نمیشه
/// - `history` جدیدترین دسترسی رو اول داره
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    /// کد کوتاه (کلید یکتا)
    pub code: String,

    /// آدرس اصلی (trim شده)
    pub long_url: String,

    /// زمان ساخت
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    /// زمان انقضا
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,

    /// مدت اعتبار (دقیقه)
    pub validity_mins: u32,

    /// تعداد کلیک
    pub clicks: u64,

    /// آخرین دسترسی
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_accessed: Option<DateTime<Utc>>,

    /// تاریخچه دسترسی‌ها، جدیدترین اول
    #[serde(default)]
    pub history: Vec<AccessEntry>,
}

/// یک دسترسی ثبت‌شده
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEntry {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ts: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

/// وضعیت محاسبه‌شده لینک
///
/// انقضا یک predicate هست، نه یک تغییر وضعیت ذخیره‌شده.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Active,
    Expired,
}

impl LinkRecord {
    /// ساخت رکورد جدید بدون کلیک
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        long_url: impl Into<String>,
        created_at: DateTime<Utc>,
        validity_mins: u32,
    ) -> Self {
        Self {
            code: code.into(),
            long_url: long_url.into(),
            created_at,
            expires_at: created_at + Duration::minutes(i64::from(validity_mins)),
            validity_mins,
            clicks: 0,
            last_accessed: None,
            history: Vec::new(),
        }
    }

    /// آیا در لحظه `now` منقضی شده؟
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> LinkStatus {
        if self.is_expired_at(now) {
            LinkStatus::Expired
        } else {
            LinkStatus::Active
        }
    }

    /// ثانیه‌های باقیمانده تا انقضا (حداقل صفر)
    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    /// ثبت یک دسترسی
    ///
    /// `history_limit` اگه مشخص باشه، قدیمی‌ترین entry‌ها حذف میشن.
    pub fn register_access(
        &mut self,
        now: DateTime<Utc>,
        referrer: Option<String>,
        history_limit: Option<usize>,
    ) {
        self.clicks = self.clicks.saturating_add(1);
        self.last_accessed = Some(now);
        self.history.insert(0, AccessEntry { ts: now, referrer });

        if let Some(limit) = history_limit {
            self.history.truncate(limit);
        }
    }
}

// =====================================
// Resolve Outcome
// =====================================
/// نتیجه resolve یک کد
///
/// پیدا نشدن و منقضی بودن خطا نیستن؛ نتیجه‌های عادی و پرتکرار هستن.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// کد وجود نداره
    NotFound,
    /// کد وجود داره ولی منقضی شده (رکورد دست نخورده)
    Expired,
    /// دسترسی ثبت شد
    Found(LinkRecord),
}

impl ResolveOutcome {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }

    /// رکورد، اگه پیدا شده باشه
    #[must_use]
    pub fn record(&self) -> Option<&LinkRecord> {
        match self {
            Self::Found(record) => Some(record),
            _ => None,
        }
    }
}

// =====================================
// API Request DTOs
// =====================================
/// درخواست ساخت لینک کوتاه
///
/// # مثال
/// ```rust
/// use shortlink_registry::models::CreateLinkRequest;
///
/// let request = CreateLinkRequest::new("https://example.com")
///     .custom_code("promo")
///     .validity_mins(5);
/// assert_eq!(request.custom_code.as_deref(), Some("promo"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    /// آدرس اصلی
    pub long_url: String,

    /// کد سفارشی (اختیاری)
    #[serde(default)]
    pub custom_code: Option<String>,

    /// مدت اعتبار به دقیقه (اختیاری، پیش‌فرض از تنظیمات)
    #[serde(default)]
    pub validity_mins: Option<u32>,
}

impl CreateLinkRequest {
    #[must_use]
    pub fn new(long_url: impl Into<String>) -> Self {
        Self {
            long_url: long_url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn custom_code(mut self, code: impl Into<String>) -> Self {
        self.custom_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn validity_mins(mut self, mins: u32) -> Self {
        self.validity_mins = Some(mins);
        self
    }

    /// تعداد ورودی‌های ارائه‌شده (برای رویداد `action.start`)
    #[must_use]
    pub fn arg_count(&self) -> usize {
        1 + usize::from(self.custom_code.is_some()) + usize::from(self.validity_mins.is_some())
    }
}

// =====================================
// API Response DTOs
// =====================================
/// پاسخ لینک برای کلاینت
///
/// history برای نمایش به `HISTORY_DISPLAY_LIMIT` محدود میشه.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub code: String,
    pub short_url: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub validity_mins: u32,
    pub clicks: u64,
    pub last_accessed: Option<DateTime<Utc>>,
    pub status: LinkStatus,
    pub remaining_secs: i64,
    pub history: Vec<AccessEntry>,
}

impl LinkResponse {
    /// تبدیل از LinkRecord entity
    #[must_use]
    pub fn from_record(record: &LinkRecord, base_url: &str, now: DateTime<Utc>) -> Self {
        Self {
            code: record.code.clone(),
            short_url: format!("{}/{}", base_url.trim_end_matches('/'), record.code),
            long_url: record.long_url.clone(),
            created_at: record.created_at,
            expires_at: record.expires_at,
            validity_mins: record.validity_mins,
            clicks: record.clicks,
            last_accessed: record.last_accessed,
            status: record.status_at(now),
            remaining_secs: record.remaining_secs(now),
            history: record
                .history
                .iter()
                .take(HISTORY_DISPLAY_LIMIT)
                .cloned()
                .collect(),
        }
    }
}

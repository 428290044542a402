//! # AccessTracker
//!
//! تبدیل کد به رکورد، همراه با بررسی انقضا و ثبت آمار دسترسی.
//!
//! بررسی انقضا و افزایش counter داخل یک `update` اتمیک انجام میشه؛
//! دو resolve همزمان هیچوقت یک کلیک رو گم نمیکنن و رکورد منقضی‌شده
//! هیچوقت تغییر نمیکنه.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, instrument, warn};

use super::{AuditLog, Registry, RegistryChange};
use crate::{
    error::Result,
    models::{event_types, ResolveOutcome},
    utils::Clock,
};

/// ردیاب دسترسی‌ها
#[derive(Clone)]
pub struct AccessTracker {
    registry: Registry,
    audit: AuditLog,
    clock: Arc<dyn Clock>,
    history_limit: Option<usize>,
}

impl AccessTracker {
    /// # Arguments
    /// * `history_limit` - حداکثر طول history هر رکورد؛ `None` یعنی بدون محدودیت
    #[must_use]
    pub fn new(
        registry: Registry,
        audit: AuditLog,
        clock: Arc<dyn Clock>,
        history_limit: Option<usize>,
    ) -> Self {
        Self {
            registry,
            audit,
            clock,
            history_limit,
        }
    }

    /// Resolve یک کد
    ///
    /// - کد ناموجود: رویداد `shortlink.miss` و `NotFound`
    /// - منقضی (`expires_at < now`): رویداد `shortlink.expired` و `Expired`
    /// - در غیر این صورت: `clicks += 1`، `last_accessed = now`، یک entry به
    ///   ابتدای history، رویداد `shortlink.accessed` و `Found`
    ///
    /// # Errors
    /// فقط خطای store؛ پیدا نشدن و انقضا خطا نیستن
    #[instrument(skip(self))]
    pub async fn resolve(&self, code: &str, referrer: Option<&str>) -> Result<ResolveOutcome> {
        let now = self.clock.now();
        let referrer = referrer
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(ToString::to_string);
        let history_limit = self.history_limit;

        let entry_referrer = referrer.clone();
        let record = self
            .registry
            .update_record(code, move |mut record| {
                if !record.is_expired_at(now) {
                    record.register_access(now, entry_referrer, history_limit);
                }
                record
            })
            .await?;

        let Some(record) = record else {
            warn!(code = %code, "Short link not found");
            self.audit
                .record(event_types::SHORTLINK_MISS, json!({ "code": code }))
                .await;
            return Ok(ResolveOutcome::NotFound);
        };

        if record.is_expired_at(now) {
            warn!(code = %code, expires_at = %record.expires_at, "Short link expired");
            self.audit
                .record(
                    event_types::SHORTLINK_EXPIRED,
                    json!({
                        "code": code,
                        "expiresAt": record.expires_at.timestamp_millis(),
                    }),
                )
                .await;
            return Ok(ResolveOutcome::Expired);
        }

        self.audit
            .record(
                event_types::SHORTLINK_ACCESSED,
                json!({
                    "code": code,
                    "clicks": record.clicks,
                    "referrer": referrer,
                }),
            )
            .await;
        self.registry.notify(RegistryChange::Accessed {
            code: record.code.clone(),
            clicks: record.clicks,
        });

        info!(code = %code, clicks = record.clicks, "Short link accessed");
        Ok(ResolveOutcome::Found(record))
    }
}

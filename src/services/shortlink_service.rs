//! # سرویس لینک کوتاه
//!
//! Facade عملیات برنامه. هر عملی که داده رو تغییر میده از
//! `ActionMiddleware` رد میشه؛ عملیات فقط-خواندنی مستقیم اجرا میشن.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::instrument;

use super::{
    AccessTracker, ActionMiddleware, AuditLog, Registry, RegistryChange, RegistrySettings,
};
use crate::{
    config::Config,
    error::{AppError, Result},
    models::{AuditLogEntry, CreateLinkRequest, LinkRecord, ResolveOutcome},
    store::KeyValueStore,
    utils::Clock,
};

/// نام عمل‌ها در رویدادهای `action.*`
pub mod action_names {
    pub const CREATE_SHORT_LINK: &str = "createShortLink";
    pub const RESOLVE_SHORT_LINK: &str = "resolveShortLink";
    pub const DELETE_SHORT_LINK: &str = "deleteShortLink";
}

/// سرویس اصلی
#[derive(Clone)]
pub struct ShortLinkService {
    registry: Registry,
    tracker: AccessTracker,
    audit: AuditLog,
    middleware: ActionMiddleware,
    clock: Arc<dyn Clock>,
}

impl ShortLinkService {
    /// سیم‌کشی همه اجزا روی یک store و یک clock
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, config: &Config, clock: Arc<dyn Clock>) -> Self {
        let audit = AuditLog::new(store.clone(), clock.clone(), config.audit_log_cap);
        let registry = Registry::new(
            store,
            audit.clone(),
            clock.clone(),
            RegistrySettings::from(config),
        );
        let tracker = AccessTracker::new(
            registry.clone(),
            audit.clone(),
            clock.clone(),
            config.history_limit(),
        );
        let middleware = ActionMiddleware::new(audit.clone());

        Self {
            registry,
            tracker,
            audit,
            middleware,
            clock,
        }
    }

    /// ساخت لینک کوتاه
    ///
    /// # Errors
    /// - `Validation`: ورودی نامعتبر
    /// - `Conflict`: کد سفارشی تکراری
    #[instrument(skip(self, request), fields(long_url = %request.long_url))]
    pub async fn create_short_link(&self, request: CreateLinkRequest) -> Result<LinkRecord> {
        self.middleware
            .wrap(action_names::CREATE_SHORT_LINK, request.arg_count(), || {
                self.registry.create(
                    &request.long_url,
                    request.custom_code.as_deref(),
                    request.validity_mins,
                )
            })
            .await
    }

    /// Resolve و ثبت دسترسی
    pub async fn resolve_short_link(
        &self,
        code: &str,
        referrer: Option<&str>,
    ) -> Result<ResolveOutcome> {
        let arg_count = 1 + usize::from(referrer.is_some());
        self.middleware
            .wrap(action_names::RESOLVE_SHORT_LINK, arg_count, || {
                self.tracker.resolve(code, referrer)
            })
            .await
    }

    /// حذف لینک (idempotent)
    pub async fn delete_short_link(&self, code: &str) -> Result<()> {
        self.middleware
            .wrap(action_names::DELETE_SHORT_LINK, 1, || self.registry.delete(code))
            .await
    }

    /// همه لینک‌ها، جدیدترین اول
    pub async fn list_short_links(&self) -> Result<Vec<LinkRecord>> {
        self.registry.list_sorted().await
    }

    /// یک لینک، بدون ثبت دسترسی
    ///
    /// # Errors
    /// `NotFound` اگه کد وجود نداشته باشه
    pub async fn get_short_link(&self, code: &str) -> Result<LinkRecord> {
        self.registry
            .get(code)
            .await?
            .ok_or_else(|| AppError::link_not_found(code))
    }

    /// کل audit log، جدیدترین اول
    pub async fn get_audit_log(&self) -> Result<Vec<AuditLogEntry>> {
        self.audit.get_all().await
    }

    pub async fn clear_audit_log(&self) -> Result<()> {
        self.audit.clear().await
    }

    #[must_use]
    pub fn subscribe_links(&self) -> broadcast::Receiver<RegistryChange> {
        self.registry.subscribe()
    }

    #[must_use]
    pub fn subscribe_audit(&self) -> broadcast::Receiver<AuditLogEntry> {
        self.audit.subscribe()
    }

    /// زمان فعلی از همون clock سرویس
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

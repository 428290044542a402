//! # Registry لینک‌ها
//!
//! مالک مجموعه `LinkRecord`‌ها روی namespace `links` در store.
//!
//! ## Invariant اصلی
//! در هر لحظه حداکثر یک رکورد برای هر `code` وجود داره. ساخت با یک
//! insert-if-absent اتمیک (`update`) انجام میشه، پس حتی اگه بین بررسی
//! وجود و نوشتن کسی همون کد رو بگیره، نتیجه `Conflict` هست نه overwrite.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{info, instrument};

use super::{AuditLog, CodeGenerator, CodeLookup, CodeValidation};
use crate::{
    config::Config,
    error::{AppError, Result},
    models::{event_types, LinkRecord},
    store::{KeyValueStore, LINKS_NAMESPACE},
    utils::{self, Clock},
};

/// ظرفیت کانال تغییرات
const CHANGES_CAPACITY: usize = 256;

/// تنظیمات Registry
#[derive(Debug, Clone, Copy)]
pub struct RegistrySettings {
    /// طول پایه کدهای تولیدی
    pub code_length: usize,
    /// مدت اعتبار پیش‌فرض (دقیقه)
    pub default_validity_mins: u32,
}

impl From<&Config> for RegistrySettings {
    fn from(config: &Config) -> Self {
        Self {
            code_length: config.code_length,
            default_validity_mins: config.default_validity_mins,
        }
    }
}

/// تغییرات Registry برای subscriber‌ها (مثلا UI)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryChange {
    Created(String),
    Deleted(String),
    Accessed { code: String, clicks: u64 },
}

/// Registry لینک‌های کوتاه
#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn KeyValueStore>,
    audit: AuditLog,
    clock: Arc<dyn Clock>,
    settings: RegistrySettings,
    changes: broadcast::Sender<RegistryChange>,
}

impl Registry {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        audit: AuditLog,
        clock: Arc<dyn Clock>,
        settings: RegistrySettings,
    ) -> Self {
        let (changes, _) = broadcast::channel(CHANGES_CAPACITY);
        Self {
            store,
            audit,
            clock,
            settings,
            changes,
        }
    }

    /// ساخت لینک کوتاه جدید
    ///
    /// # Arguments
    /// * `long_url` - آدرس اصلی (trim میشه)
    /// * `custom_code` - کد سفارشی؛ رشته خالی یعنی ارائه نشده
    /// * `validity_mins` - مدت اعتبار؛ `None` یعنی مقدار پیش‌فرض
    ///
    /// # Errors
    /// - `Validation`: URL خالی/خراب، کد سفارشی نامعتبر یا مدت اعتبار صفر
    /// - `Conflict`: کد سفارشی قبلا ثبت شده
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        long_url: &str,
        custom_code: Option<&str>,
        validity_mins: Option<u32>,
    ) -> Result<LinkRecord> {
        let long_url = utils::validate_long_url(long_url)?;

        let validity_mins = validity_mins.unwrap_or(self.settings.default_validity_mins);
        if validity_mins == 0 {
            return Err(AppError::Validation(
                "Validity must be a positive number of minutes".to_string(),
            ));
        }

        let custom_code = custom_code.map(str::trim).filter(|c| !c.is_empty());
        let code = match custom_code {
            Some(code) => {
                if let CodeValidation::Invalid(reason) = CodeGenerator::validate_custom(code) {
                    return Err(AppError::Validation(reason));
                }
                if utils::is_reserved_code(code) {
                    return Err(AppError::Validation(format!(
                        "Short code '{}' conflicts with reserved routes",
                        code
                    )));
                }
                if self.exists(code).await? {
                    return Err(AppError::code_taken(code));
                }
                code.to_string()
            }
            None => CodeGenerator::find_unique(self, self.settings.code_length).await?,
        };

        let record = LinkRecord::new(code, long_url, self.clock.now(), validity_mins);
        let value = serde_json::to_value(&record)?;
        let code_for_conflict = record.code.clone();

        self.store
            .update(
                LINKS_NAMESPACE,
                &record.code,
                Box::new(move |current: Option<Value>| match current {
                    Some(_) => Err(AppError::code_taken(&code_for_conflict)),
                    None => Ok(Some(value)),
                }),
            )
            .await?;

        self.audit
            .record(
                event_types::SHORTLINK_CREATED,
                json!({
                    "code": record.code,
                    "longUrl": record.long_url,
                    "validityMins": record.validity_mins,
                    "expiresAt": record.expires_at.timestamp_millis(),
                }),
            )
            .await;
        self.notify(RegistryChange::Created(record.code.clone()));

        info!(code = %record.code, expires_at = %record.expires_at, "Created short link");
        Ok(record)
    }

    /// گرفتن رکورد
    pub async fn get(&self, code: &str) -> Result<Option<LinkRecord>> {
        self.store
            .get(LINKS_NAMESPACE, code)
            .await?
            .map(serde_json::from_value)
            .transpose()
            .map_err(AppError::from)
    }

    /// حذف رکورد؛ اگه نباشه هیچ کاری نمیکنه
    #[instrument(skip(self))]
    pub async fn delete(&self, code: &str) -> Result<()> {
        let existed = self.store.delete(LINKS_NAMESPACE, code).await?;

        self.audit
            .record(
                event_types::SHORTLINK_DELETED,
                json!({ "code": code, "existed": existed }),
            )
            .await;

        if existed {
            self.notify(RegistryChange::Deleted(code.to_string()));
            info!(code = %code, "Deleted short link");
        }

        Ok(())
    }

    /// همه رکوردها به ترتیب store (بدون ترتیب تضمین‌شده)
    pub async fn list(&self) -> Result<Vec<LinkRecord>> {
        self.store
            .list(LINKS_NAMESPACE)
            .await?
            .into_iter()
            .map(|(_, value)| serde_json::from_value(value).map_err(AppError::from))
            .collect()
    }

    /// همه رکوردها، جدیدترین ساخته‌شده اول
    pub async fn list_sorted(&self) -> Result<Vec<LinkRecord>> {
        let mut records = self.list().await?;
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.code.cmp(&b.code))
        });
        Ok(records)
    }

    pub async fn exists(&self, code: &str) -> Result<bool> {
        Ok(self.store.get(LINKS_NAMESPACE, code).await?.is_some())
    }

    /// اشتراک در تغییرات Registry
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryChange> {
        self.changes.subscribe()
    }

    /// خواندن-تغییر-نوشتن اتمیک یک رکورد
    ///
    /// `None` اگه رکورد وجود نداشته باشه (و چیزی ساخته نمیشه).
    pub(crate) async fn update_record<F>(&self, code: &str, f: F) -> Result<Option<LinkRecord>>
    where
        F: FnOnce(LinkRecord) -> LinkRecord + Send + 'static,
    {
        let updated = self
            .store
            .update(
                LINKS_NAMESPACE,
                code,
                Box::new(move |current: Option<Value>| match current {
                    None => Ok(None),
                    Some(value) => {
                        let record: LinkRecord = serde_json::from_value(value)?;
                        Ok(Some(serde_json::to_value(f(record))?))
                    }
                }),
            )
            .await?;

        Ok(updated.map(serde_json::from_value).transpose()?)
    }

    pub(crate) fn notify(&self, change: RegistryChange) {
        // بدون subscriber خطا میده که مهم نیست
        let _ = self.changes.send(change);
    }
}

#[async_trait]
impl CodeLookup for Registry {
    // کدهای رزرو شده هم "گرفته" حساب میشن تا تولید نشن
    async fn code_exists(&self, code: &str) -> Result<bool> {
        if utils::is_reserved_code(code) {
            return Ok(true);
        }
        self.exists(code).await
    }
}

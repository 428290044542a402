//! # سرویس Audit Log
//!
//! لاگ append-only و سقف‌دار از رویدادهای کسب‌وکار.
//!
//! ## Invariant‌ها
//! - ترتیب: جدیدترین اول
//! - طول لاگ هیچوقت از `cap` بیشتر نمیشه؛ قدیمی‌ترین‌ها اول حذف میشن
//!
//! کل لاگ زیر یک کلید (`audit/entries`) ذخیره میشه و هر append با `update`
//! اتمیک انجام میشه، پس دو append همزمان همدیگه رو پاک نمیکنن.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    error::Result,
    models::AuditLogEntry,
    store::{KeyValueStore, AUDIT_NAMESPACE},
    utils::Clock,
};

/// کلید آرایه رکوردها در namespace `audit`
const ENTRIES_KEY: &str = "entries";

/// ظرفیت کانال اعلان‌ها
const NOTIFY_CAPACITY: usize = 256;

/// Audit log سقف‌دار
///
/// یک نمونه صریح که به Registry، AccessTracker و ActionMiddleware تزریق
/// میشه. Clone‌ها store و کانال اعلان مشترک دارن.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    cap: usize,
    events: broadcast::Sender<AuditLogEntry>,
}

impl AuditLog {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, cap: usize) -> Self {
        let (events, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            store,
            clock,
            cap,
            events,
        }
    }

    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// اضافه کردن یک رکورد به ابتدای لاگ
    ///
    /// # Errors
    /// خطای store یا سریالایز
    pub async fn append(&self, event_type: &str, payload: Value) -> Result<AuditLogEntry> {
        let entry = AuditLogEntry::new(event_type, payload, self.clock.now());
        let value = serde_json::to_value(&entry)?;
        let cap = self.cap;

        // مقادیر خام JSON جابجا میشن؛ نیازی به دیسریالایز کل لاگ نیست
        self.store
            .update(
                AUDIT_NAMESPACE,
                ENTRIES_KEY,
                Box::new(move |current: Option<Value>| {
                    let mut entries = match current {
                        Some(Value::Array(items)) => items,
                        Some(other) => {
                            warn!(found = %other, "Audit log value is not an array, resetting");
                            Vec::new()
                        }
                        None => Vec::new(),
                    };
                    entries.insert(0, value);
                    entries.truncate(cap);
                    Ok(Some(Value::Array(entries)))
                }),
            )
            .await?;

        debug!(event_type = %entry.event_type, id = %entry.id, "Audit entry appended");

        // بدون subscriber خطا میده که مهم نیست
        let _ = self.events.send(entry.clone());

        Ok(entry)
    }

    /// مثل `append`، ولی خطای نوشتن فقط لاگ میشه
    ///
    /// برای جاهایی که audit نباید مسیر داده اصلی رو خراب کنه.
    pub async fn record(&self, event_type: &str, payload: Value) -> Option<AuditLogEntry> {
        match self.append(event_type, payload).await {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, event_type, "Failed to write audit entry");
                None
            }
        }
    }

    /// همه رکوردها، جدیدترین اول
    pub async fn get_all(&self) -> Result<Vec<AuditLogEntry>> {
        match self.store.get(AUDIT_NAMESPACE, ENTRIES_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    /// خالی کردن لاگ
    pub async fn clear(&self) -> Result<()> {
        self.store.delete(AUDIT_NAMESPACE, ENTRIES_KEY).await?;
        info!("Audit log cleared");
        Ok(())
    }

    /// اشتراک در رکوردهای جدید (جایگزین polling)
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuditLogEntry> {
        self.events.subscribe()
    }
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event_types;
    use crate::store::MemoryStore;
    use crate::utils::ManualClock;
    use chrono::Duration;
    use serde_json::json;

    fn audit_log(cap: usize) -> (AuditLog, ManualClock) {
        let clock = ManualClock::default();
        let log = AuditLog::new(Arc::new(MemoryStore::new()), Arc::new(clock.clone()), cap);
        (log, clock)
    }

    #[tokio::test]
    async fn test_newest_first() {
        let (log, clock) = audit_log(10);

        log.append(event_types::ACTION_START, json!({"n": 1})).await.unwrap();
        clock.advance(Duration::seconds(1));
        log.append(event_types::ACTION_SUCCESS, json!({"n": 2})).await.unwrap();

        let entries = log.get_all().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event_type, event_types::ACTION_SUCCESS);
        assert_eq!(entries[1].payload, json!({"n": 1}));
        assert!(entries[0].timestamp > entries[1].timestamp);
    }

    #[tokio::test]
    async fn test_cap_evicts_oldest() {
        let (log, _) = audit_log(1000);

        for n in 0..1001 {
            log.append("test.event", json!({"n": n})).await.unwrap();
        }

        let entries = log.get_all().await.unwrap();
        assert_eq!(entries.len(), 1000);
        assert_eq!(entries[0].payload, json!({"n": 1000}));
        // رکورد n=0 حذف شده
        assert_eq!(entries[999].payload, json!({"n": 1}));
    }

    #[tokio::test]
    async fn test_clear() {
        let (log, _) = audit_log(10);
        log.append("test.event", json!({})).await.unwrap();

        log.clear().await.unwrap();

        assert!(log.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_receives_entries() {
        let (log, _) = audit_log(10);
        let mut rx = log.subscribe();

        let appended = log.append(event_types::SHORTLINK_MISS, json!({"code": "x"})).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), appended);
    }
}

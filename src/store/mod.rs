//! # لایه Store (Key-Value Persistence)
//!
//! این ماژول لایه ذخیره‌سازی برنامه رو تعریف میکنه: یه نگاشت پایدار از
//! کلید رشته‌ای به مقدار JSON، که کلیدها در namespace‌های جدا گروه‌بندی میشن.
//!
//! ## Namespace‌ها
//! - `links`: کلید = short code، مقدار = `LinkRecord`
//! - `audit`: یه کلید `entries` که آرایه `AuditLogEntry` رو نگه میداره
//!
//! ## الگوهای طراحی:
//! - Repository Pattern: منطق برنامه نمیدونه داده کجا ذخیره میشه
//! - Compare-and-swap: عملیات `update` خواندن-تغییر-نوشتن رو اتمیک میکنه
//!
//! ## Backend‌ها
//! - [`MemoryStore`]: درون حافظه با `RwLock` (تست و اجرای موقت)
//! - [`SqliteStore`]: SQLite با sqlx و تراکنش

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::error::Result;

/// namespace رکوردهای لینک
pub const LINKS_NAMESPACE: &str = "links";

/// namespace لاگ audit
pub const AUDIT_NAMESPACE: &str = "audit";

/// تابع تغییر برای `update`
///
/// مقدار فعلی (یا `None`) رو میگیره و مقدار جدید رو برمیگردونه.
/// - `Ok(Some(v))`: `v` ذخیره میشه
/// - `Ok(None)`: کلید حذف میشه (اگه وجود داشته باشه)
/// - `Err(e)`: هیچ چیزی نوشته نمیشه و خطا برمیگرده
pub type UpdateFn = Box<dyn FnOnce(Option<Value>) -> Result<Option<Value>> + Send>;

// =====================================
// KeyValueStore Trait
// =====================================
/// Trait پایه برای همه backend‌های ذخیره‌سازی
///
/// # مفاهیم:
/// - `#[async_trait]`: macro برای async در traits
/// - `Send + Sync`: امکان اشتراک بین threads پشت `Arc<dyn KeyValueStore>`
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// خوندن یک مقدار
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>>;

    /// نوشتن (insert یا overwrite)
    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<()>;

    /// حذف؛ `true` اگه کلید وجود داشت
    async fn delete(&self, namespace: &str, key: &str) -> Result<bool>;

    /// همه جفت‌های کلید/مقدار یک namespace (بدون ترتیب تضمین‌شده)
    async fn list(&self, namespace: &str) -> Result<Vec<(String, Value)>>;

    /// خواندن-تغییر-نوشتن اتمیک
    ///
    /// هیچ نوشتن دیگه‌ای روی همون کلید نمیتونه بین خواندن و نوشتن این
    /// عملیات اتفاق بیفته. مقدار نهایی ذخیره‌شده رو برمیگردونه.
    async fn update(&self, namespace: &str, key: &str, f: UpdateFn) -> Result<Option<Value>>;

    /// بررسی سلامت backend
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

// =====================================
// Store Factory
// =====================================
/// ساخت store از روی آدرس تنظیمات
///
/// - `memory` یا `memory://` → [`MemoryStore`]
/// - هر چیز دیگه → [`SqliteStore`] به همراه اجرای migration‌ها
///
/// # Errors
/// خطا برمیگردونه اگه اتصال یا migration موفق نباشه
pub async fn connect(database_url: &str) -> Result<Arc<dyn KeyValueStore>> {
    if database_url == "memory" || database_url.starts_with("memory://") {
        info!("Using in-memory key-value store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = SqliteStore::connect(database_url).await?;
    store.migrate().await?;
    info!("Using SQLite key-value store");
    Ok(Arc::new(store))
}

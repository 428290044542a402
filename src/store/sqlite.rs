//! # Backend SQLite
//!
//! یک جدول `kv_entries` با کلید اصلی `(namespace, key)`. مقادیر به صورت
//! متن JSON ذخیره میشن.
//!
//! ## مفاهیم:
//! - Connection Pool با `SqlitePoolOptions`
//! - Transaction برای `update`: یا همه یا هیچ
//! - `sqlx::migrate!`: اعمال schema از پوشه `migrations`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{
    migrate::Migrator,
    sqlite::{SqlitePool, SqlitePoolOptions},
};
use tokio::sync::Mutex;

use super::{KeyValueStore, UpdateFn};
use crate::error::Result;

// مسیر migration‌ها
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Store مبتنی بر SQLite
///
/// `write_lock` همه نوشتن‌ها داخل همین process رو سریالی میکنه؛
/// تراکنش SQLite جلوی نوشتن همزمان از process دیگه رو میگیره
/// (نویسنده دوم `SQLITE_BUSY` میگیره، نه یک increment گم‌شده).
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Arc<SqlitePool>,
    write_lock: Arc<Mutex<()>>,
}

impl SqliteStore {
    /// اتصال به دیتابیس
    ///
    /// # Arguments
    /// * `database_url` - آدرس دیتابیس (مثلا `sqlite://data/shortlinks.db?mode=rwc`)
    ///
    /// # Errors
    /// خطا برمیگردونه اگه اتصال موفق نباشه
    pub async fn connect(database_url: impl AsRef<str>) -> Result<Self> {
        let url = database_url.as_ref();

        // ساخت پوشه فایل دیتابیس اگه وجود نداره
        if let Some(path) = url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .connect(url)
            .await?;

        Ok(Self::from_pool(pool))
    }

    /// دیتابیس in-memory با migration اجرا شده
    ///
    /// یک اتصال تنها، چون هر اتصال `:memory:` دیتابیس جدای خودش رو داره.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// اجرای migration‌ها
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&*self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>> {
        let raw = sqlx::query_scalar::<_, String>(
            "SELECT value FROM kv_entries WHERE namespace = ? AND key = ?",
        )
        .bind(namespace)
        .bind(key)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(raw.map(|s| serde_json::from_str(&s)).transpose()?)
    }

    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        sqlx::query(
            r#"
            INSERT INTO kv_entries (namespace, key, value, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(namespace, key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(namespace)
        .bind(key)
        .bind(value.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let result = sqlx::query("DELETE FROM kv_entries WHERE namespace = ? AND key = ?")
            .bind(namespace)
            .bind(key)
            .execute(&*self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, namespace: &str) -> Result<Vec<(String, Value)>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT key, value FROM kv_entries WHERE namespace = ?",
        )
        .bind(namespace)
        .fetch_all(&*self.pool)
        .await?;

        rows.into_iter()
            .map(|(key, raw)| Ok((key, serde_json::from_str(&raw)?)))
            .collect()
    }

    async fn update(&self, namespace: &str, key: &str, f: UpdateFn) -> Result<Option<Value>> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, String>(
            "SELECT value FROM kv_entries WHERE namespace = ? AND key = ?",
        )
        .bind(namespace)
        .bind(key)
        .fetch_optional(&mut *tx)
        .await?
        .map(|s| serde_json::from_str::<Value>(&s))
        .transpose()?;

        // خطای f باعث drop شدن tx و rollback خودکار میشه
        let next = f(current)?;

        match &next {
            Some(value) => {
                sqlx::query(
                    r#"
                    INSERT INTO kv_entries (namespace, key, value, updated_at)
                    VALUES (?, ?, ?, ?)
                    ON CONFLICT(namespace, key)
                    DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                    "#,
                )
                .bind(namespace)
                .bind(key)
                .bind(value.to_string())
                .bind(Utc::now().to_rfc3339())
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM kv_entries WHERE namespace = ? AND key = ?")
                    .bind(namespace)
                    .bind(key)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(next)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&*self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_roundtrip_through_sqlite() {
        let store = SqliteStore::in_memory().await.unwrap();

        store.set("links", "abc", json!({"clicks": 1})).await.unwrap();
        store.set("links", "abc", json!({"clicks": 2})).await.unwrap();

        assert_eq!(
            store.get("links", "abc").await.unwrap(),
            Some(json!({"clicks": 2}))
        );
        assert_eq!(store.list("links").await.unwrap().len(), 1);
        assert!(store.list("audit").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_none_deletes() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.set("links", "abc", json!(1)).await.unwrap();

        let result = store.update("links", "abc", Box::new(|_: Option<Value>| Ok(None))).await.unwrap();

        assert_eq!(result, None);
        assert_eq!(store.get("links", "abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_increments() {
        let store = SqliteStore::in_memory().await.unwrap();

        for _ in 0..3 {
            store
                .update(
                    "links",
                    "n",
                    Box::new(|current: Option<Value>| {
                        let n = current.and_then(|v| v.as_u64()).unwrap_or(0);
                        Ok(Some(json!(n + 1)))
                    }),
                )
                .await
                .unwrap();
        }

        assert_eq!(store.get("links", "n").await.unwrap(), Some(json!(3)));
    }

    #[tokio::test]
    async fn test_health_check() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert!(store.health_check().await.is_ok());
    }
}

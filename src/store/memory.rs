//! # Backend درون حافظه
//!
//! `RwLock` از tokio کل map رو محافظت میکنه. `update` قفل نوشتن رو
//! از خواندن تا نوشتن نگه میداره، پس اتمیک هست.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{KeyValueStore, UpdateFn};
use crate::error::Result;

type Namespaces = HashMap<String, HashMap<String, Value>>;

/// Store درون حافظه
///
/// Clone فقط `Arc` رو کپی میکنه؛ همه clone‌ها یک داده مشترک دارن.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Namespaces>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>> {
        let data = self.data.read().await;
        Ok(data.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<()> {
        let mut data = self.data.write().await;
        data.entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<bool> {
        let mut data = self.data.write().await;
        Ok(data
            .get_mut(namespace)
            .and_then(|ns| ns.remove(key))
            .is_some())
    }

    async fn list(&self, namespace: &str) -> Result<Vec<(String, Value)>> {
        let data = self.data.read().await;
        Ok(data
            .get(namespace)
            .map(|ns| ns.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn update(&self, namespace: &str, key: &str, f: UpdateFn) -> Result<Option<Value>> {
        let mut data = self.data.write().await;
        let ns = data.entry(namespace.to_string()).or_default();

        let current = ns.get(key).cloned();
        // اگه f خطا بده، map دست نخورده میمونه
        match f(current)? {
            Some(next) => {
                ns.insert(key.to_string(), next.clone());
                Ok(Some(next))
            }
            None => {
                ns.remove(key);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    #[tokio::test]
    async fn test_namespaces_are_disjoint() {
        let store = MemoryStore::new();
        store.set("links", "k", json!(1)).await.unwrap();
        store.set("audit", "k", json!(2)).await.unwrap();

        assert_eq!(store.get("links", "k").await.unwrap(), Some(json!(1)));
        assert_eq!(store.get("audit", "k").await.unwrap(), Some(json!(2)));
        assert_eq!(store.list("links").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("links", "k", json!(1)).await.unwrap();

        assert!(store.delete("links", "k").await.unwrap());
        assert!(!store.delete("links", "k").await.unwrap());
        assert!(!store.delete("missing", "k").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_error_leaves_value() {
        let store = MemoryStore::new();
        store.set("links", "k", json!(1)).await.unwrap();

        let result = store
            .update("links", "k", Box::new(|_: Option<Value>| Err(AppError::Conflict("taken".into()))))
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(store.get("links", "k").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_concurrent_updates_do_not_lose_increments() {
        let store = MemoryStore::new();
        store.set("links", "counter", json!(0)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update(
                        "links",
                        "counter",
                        Box::new(|current: Option<Value>| {
                            let n = current.and_then(|v| v.as_u64()).unwrap_or(0);
                            Ok(Some(json!(n + 1)))
                        }),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.get("links", "counter").await.unwrap(), Some(json!(50)));
    }
}

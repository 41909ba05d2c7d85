use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend: {0}")]
    Backend(#[from] sqlx::Error),

    #[error("record under {key} does not decode: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record for {key} does not encode: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable key-value storage. Every persisted record goes through this seam.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Reads `key` and decodes it into `T`.
pub async fn load<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_value(raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

pub async fn save<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_value(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, raw).await
}

pub mod keys {
    use time::Date;
    use uuid::Uuid;

    pub const USERS: &str = "users";
    pub const EARLY_ACCESS: &str = "early_access";

    pub fn user(id: Uuid) -> String {
        format!("user:{id}")
    }

    pub fn meals(user_id: Uuid, date: Date) -> String {
        format!("meals:{user_id}:{date}")
    }

    pub fn activities(user_id: Uuid, date: Date) -> String {
        format!("activities:{user_id}:{date}")
    }

    pub fn scan_usage(user_id: Uuid) -> String {
        format!("scan_usage:{user_id}")
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KvStore for PgStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query_as::<_, (Value,)>(
            r#"
            SELECT value
              FROM kv_store
             WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(|(v,)| v))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE
               SET value = EXCLUDED.value,
                   updated_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv_store WHERE key = $1")
            .bind(key)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Per-key async mutexes. Hold the guard across a load/modify/save sequence
/// so concurrent requests for the same record cannot lose updates.
#[derive(Default)]
pub struct KeyLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(key.to_string()).or_default().clone()
        };
        slot.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Counter {
        count: u32,
    }

    #[tokio::test]
    async fn memory_store_get_set_delete() {
        let store = MemoryStore::new();
        assert!(store.get("k").await.unwrap().is_none());
        store.set("k", json!({"count": 1})).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!({"count": 1})));
        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn typed_helpers_decode_at_boundary() {
        let store = MemoryStore::new();
        save(&store, "c", &Counter { count: 3 }).await.unwrap();
        let loaded: Option<Counter> = load(&store, "c").await.unwrap();
        assert_eq!(loaded, Some(Counter { count: 3 }));

        store.set("bad", json!({"count": "three"})).await.unwrap();
        let err = load::<Counter>(&store, "bad").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "bad"));
    }

    #[tokio::test]
    async fn key_locks_serialize_same_key() {
        let locks = Arc::new(KeyLocks::default());
        let store = Arc::new(MemoryStore::new());
        save(store.as_ref(), "n", &Counter { count: 0 }).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let locks = locks.clone();
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let _guard = locks.lock("n").await;
                let mut c: Counter = load(store.as_ref(), "n").await.unwrap().unwrap();
                tokio::task::yield_now().await;
                c.count += 1;
                save(store.as_ref(), "n", &c).await.unwrap();
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }
        let c: Counter = load(store.as_ref(), "n").await.unwrap().unwrap();
        assert_eq!(c.count, 20);
    }
}

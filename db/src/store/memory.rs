use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError, ensure_path};
use crate::paths;

/// Process-local store. Also counts writes so callers can assert that a
/// rejected operation touched nothing.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Value>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set`/`push` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of documents currently stored.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        ensure_path(path)?;
        Ok(self.docs.read().await.get(path).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        ensure_path(path)?;
        self.docs.write().await.insert(path.to_owned(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn push(&self, parent: &str, value: Value) -> Result<String, StoreError> {
        let key = paths::push_key();
        self.set(&format!("{parent}/{key}"), value).await?;
        Ok(key)
    }

    async fn children(&self, parent: &str) -> Result<Vec<(String, Value)>, StoreError> {
        ensure_path(parent)?;
        let prefix = format!("{parent}/");
        let docs = self.docs.read().await;
        Ok(docs
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter_map(|(path, value)| {
                let key = &path[prefix.len()..];
                (!key.contains('/')).then(|| (key.to_owned(), value.clone()))
            })
            .collect())
    }
}

//! Path-addressed JSON document store.
//!
//! The client only needs four operations from its data store: read one
//! document, overwrite one document, append a child under a generated key,
//! and list the direct children of a path. [`DocumentStore`] captures that
//! surface; [`read_as`] and [`write_as`] add typed access on top.

mod memory;
mod rest;
mod sqlite;

pub use memory::MemoryStore;
pub use rest::RestStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use sea_orm::DbErr;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::paths;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid document path '{0}'")]
    InvalidPath(String),

    #[error("database error: {0}")]
    Db(#[from] DbErr),

    #[error("realtime database request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("realtime database responded with status {0}")]
    Status(u16),

    #[error("document at '{path}' is not valid: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("value for '{path}' could not be encoded: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the document at `path`, `None` when nothing is stored there.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Writes `value` at `path`, replacing whatever was there.
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Stores `value` under a freshly generated child key of `parent` and
    /// returns that key.
    async fn push(&self, parent: &str, value: Value) -> Result<String, StoreError>;

    /// Lists the direct children of `parent` as `(key, value)` pairs, ordered
    /// by key.
    async fn children(&self, parent: &str) -> Result<Vec<(String, Value)>, StoreError>;
}

pub(crate) fn ensure_path(path: &str) -> Result<(), StoreError> {
    if paths::is_valid_path(path) {
        Ok(())
    } else {
        Err(StoreError::InvalidPath(path.to_owned()))
    }
}

/// Reads and decodes the document at `path`.
pub async fn read_as<T>(store: &dyn DocumentStore, path: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
{
    match store.get(path).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                path: path.to_owned(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encodes `value` and overwrites the document at `path`.
pub async fn write_as<T>(store: &dyn DocumentStore, path: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_value(value).map_err(|source| StoreError::Encode {
        path: path.to_owned(),
        source,
    })?;
    store.set(path, json).await
}

/// Encodes `value` and appends it under `parent`.
pub async fn push_as<T>(store: &dyn DocumentStore, parent: &str, value: &T) -> Result<String, StoreError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_value(value).map_err(|source| StoreError::Encode {
        path: parent.to_owned(),
        source,
    })?;
    store.push(parent, json).await
}

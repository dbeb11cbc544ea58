use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::Value;

use super::{DocumentStore, StoreError, ensure_path};
use crate::models::document::{ActiveModel, Column, Entity};
use crate::paths;

/// Document store persisted in the `documents` table, one row per path.
#[derive(Clone)]
pub struct SqliteStore {
    db: DatabaseConnection,
}

impl SqliteStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn decode(path: &str, body: &str) -> Result<Value, StoreError> {
        serde_json::from_str(body).map_err(|source| StoreError::Decode {
            path: path.to_owned(),
            source,
        })
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        ensure_path(path)?;
        let row = Entity::find_by_id(path.to_owned()).one(&self.db).await?;
        row.map(|r| Self::decode(&r.path, &r.body)).transpose()
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        ensure_path(path)?;
        let row = ActiveModel {
            path: Set(path.to_owned()),
            body: Set(value.to_string()),
            updated_at: Set(crate::timestamp::now()),
        };

        Entity::insert(row)
            .on_conflict(
                OnConflict::column(Column::Path)
                    .update_columns([Column::Body, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        tracing::trace!(path, "document written");
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

        let rows = Entity::find()
            .filter(Column::Path.starts_with(prefix.as_str()))
            .order_by_asc(Column::Path)
            .all(&self.db)
            .await?;

        let mut out = Vec::new();
        for row in rows {
            // LIKE treats `_` as a wildcard, so re-check the prefix exactly.
            let Some(key) = row.path.strip_prefix(&prefix) else {
                continue;
            };
            if key.contains('/') {
                continue;
            }
            out.push((key.to_owned(), Self::decode(&row.path, &row.body)?));
        }
        Ok(out)
    }
}

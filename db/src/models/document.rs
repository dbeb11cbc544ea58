use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// One JSON document of the SQLite-backed store, addressed by its full path.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub path: String,
    /// Serialized JSON value.
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

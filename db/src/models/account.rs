use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Credentials held by the local auth provider.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Opaque identity id handed out to the rest of the client.
    #[sea_orm(primary_key, auto_increment = false)]
    pub uid: String,
    /// Unique sign-in email.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

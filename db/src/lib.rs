pub mod models;
pub mod paths;
pub mod store;
pub mod test_utils;
pub mod timestamp;

use common::config::{AppConfig, StoreBackend};
use migration::Migrator;
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::path::Path;
use std::sync::Arc;

use store::{DocumentStore, MemoryStore, RestStore, SqliteStore};

/// Opens the SQLite database named by `DATABASE_PATH`.
///
/// A value that already looks like a DSN is used as-is; anything else is
/// treated as a file path whose parent directory is created on demand.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    let path_or_url = AppConfig::global().database_path.clone();
    let url = if path_or_url.starts_with("sqlite:") {
        path_or_url
    } else {
        // SQLite won't create intermediate dirs.
        if let Some(parent) = Path::new(&path_or_url).parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbErr::Custom(format!(
                    "cannot create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        format!("sqlite://{path_or_url}?mode=rwc")
    };

    tracing::debug!(%url, "connecting to database");
    Database::connect(&url).await
}

/// Applies every pending migration.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await
}

/// Builds the document store selected by `STORE_BACKEND`.
pub fn open_store(db: &DatabaseConnection) -> Arc<dyn DocumentStore> {
    let cfg = AppConfig::global();
    match cfg.store_backend {
        StoreBackend::Sqlite => Arc::new(SqliteStore::new(db.clone())),
        StoreBackend::Rest => Arc::new(RestStore::new(cfg.realtime_db_url.clone())),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    }
}

//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from `.env` and environment variables.
//! Tests can override individual fields through the per-field setters and
//! restore the environment values with [`AppConfig::reset`].

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock, RwLockReadGuard};

/// Which document store implementation backs the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// SeaORM over a local SQLite file.
    Sqlite,
    /// Realtime-database REST endpoint.
    Rest,
    /// Process-local map, nothing survives a restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "rest" => Ok(StoreBackend::Rest),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{other}'")),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Rest => "rest",
            StoreBackend::Memory => "memory",
        };
        f.write_str(name)
    }
}

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub store_backend: StoreBackend,
    pub realtime_db_url: String,
    pub anomaly_service_url: String,
    pub detection_limit: u32,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every field has a default, so this never fails. Unparseable numeric or
    /// enum values fall back to their defaults as well.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: var_or("APP_ENV", "development"),
            project_name: var_or("PROJECT_NAME", "attendai"),
            log_level: var_or("LOG_LEVEL", "attendai=info,services=info,db=info"),
            log_file: var_or("LOG_FILE", "attendai.log"),
            log_to_stdout: var_or("LOG_TO_STDOUT", "false") == "true",
            database_path: var_or("DATABASE_PATH", "data/attendai.db"),
            store_backend: env::var("STORE_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(StoreBackend::Sqlite),
            realtime_db_url: var_or("REALTIME_DB_URL", ""),
            anomaly_service_url: var_or("ANOMALY_SERVICE_URL", "http://localhost:8000"),
            detection_limit: env::var("DETECTION_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
        }
    }

    fn lock() -> &'static RwLock<AppConfig> {
        CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()))
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// A poisoned lock is recovered rather than propagated; the config holds
    /// plain values only.
    pub fn global() -> RwLockReadGuard<'static, AppConfig> {
        Self::lock().read().unwrap_or_else(|e| e.into_inner())
    }

    /// Resets the configuration by reloading from environment variables.
    pub fn reset() {
        let mut guard = Self::lock().write().unwrap_or_else(|e| e.into_inner());
        *guard = AppConfig::from_env();
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = Self::lock().write().unwrap_or_else(|e| e.into_inner());
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_store_backend(value: StoreBackend) {
        AppConfig::set_field(|cfg| cfg.store_backend = value);
    }

    pub fn set_realtime_db_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.realtime_db_url = value.into());
    }

    pub fn set_anomaly_service_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.anomaly_service_url = value.into());
    }

    pub fn set_detection_limit(value: u32) {
        AppConfig::set_field(|cfg| cfg.detection_limit = value);
    }
}

use std::sync::Arc;

use db::models::DiagnosticRecord;
use db::store::{DocumentStore, push_as};
use db::{paths, timestamp};

use crate::error::AppError;

pub const PROBE_MESSAGE: &str = "Connection test OK";

pub struct UtilService {
    store: Arc<dyn DocumentStore>,
}

impl UtilService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Appends a diagnostic entry under `test-yoklamalar` and returns its key.
    pub async fn write_diagnostic(&self, message: Option<&str>) -> Result<String, AppError> {
        let record = DiagnosticRecord {
            message: message.unwrap_or(PROBE_MESSAGE).to_owned(),
            timestamp: timestamp::now(),
        };
        let key = push_as(&*self.store, paths::DIAGNOSTICS, &record).await?;
        tracing::info!(%key, "diagnostic record written");
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::store::{MemoryStore, read_as};

    #[tokio::test]
    async fn probe_appends_under_diagnostics() {
        let store = Arc::new(MemoryStore::new());
        let util = UtilService::new(store.clone());

        let first = util.write_diagnostic(None).await.unwrap();
        let second = util.write_diagnostic(Some("hello")).await.unwrap();
        assert_ne!(first, second);

        let stored: DiagnosticRecord =
            read_as(&*store, &format!("{}/{first}", paths::DIAGNOSTICS))
                .await
                .unwrap()
                .expect("diagnostic record");
        assert_eq!(stored.message, PROBE_MESSAGE);

        let children = store.children(paths::DIAGNOSTICS).await.unwrap();
        assert_eq!(children.len(), 2);
    }
}

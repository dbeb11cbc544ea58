use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entry appended under `test-yoklamalar` by the connectivity probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub message: String,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

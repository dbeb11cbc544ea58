use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Check-in document at `katilimlar/{sessionId}/{studentId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: String,
    pub student_name: String,
    /// Copied from the scanned payload, which may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lecture: Option<String>,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

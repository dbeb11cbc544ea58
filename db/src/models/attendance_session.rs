use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle marker of a session. Nothing in the client moves a session past
/// `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Active,
}

/// Session document at `yoklamalar/{sessionId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSession {
    pub session_id: String,
    pub lecture: String,
    pub teacher_id: String,
    #[serde(with = "crate::timestamp")]
    pub start_time: DateTime<Utc>,
    pub status: SessionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn serializes_in_document_layout() {
        let session = AttendanceSession {
            session_id: "S1".into(),
            lecture: "CS101".into(),
            teacher_id: "T".into(),
            start_time: Utc.with_ymd_and_hms(2025, 10, 17, 9, 0, 0).unwrap(),
            status: SessionStatus::Active,
        };
        assert_eq!(
            serde_json::to_value(&session).unwrap(),
            json!({
                "sessionId": "S1",
                "lecture": "CS101",
                "teacherId": "T",
                "startTime": "2025-10-17T09:00:00.000Z",
                "status": "ACTIVE"
            })
        );
    }
}

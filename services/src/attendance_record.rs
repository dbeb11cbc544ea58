//! Student-side check-in.

use std::sync::Arc;

use db::models::{AttendanceRecord, Role};
use db::store::{DocumentStore, StoreError, write_as};
use db::{paths, timestamp};

use crate::context::{SessionContext, display_name_for};
use crate::error::AppError;
use crate::qr::QrPayload;

/// Result of a successful scan.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckIn {
    pub session_id: String,
    pub record: AttendanceRecord,
}

pub struct AttendanceRecordService {
    store: Arc<dyn DocumentStore>,
}

impl AttendanceRecordService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Records the caller's attendance for the session named in a scanned
    /// payload.
    ///
    /// The record lives at `(sessionId, studentId)` and is overwritten on
    /// every scan, so repeated scans refresh the timestamp instead of adding
    /// records. The referenced session is not looked up: any well-formed
    /// payload is accepted.
    pub async fn record_attendance(
        &self,
        ctx: &SessionContext,
        raw_payload: &str,
    ) -> Result<CheckIn, AppError> {
        let student = ctx.require_role(Role::Student, "record attendance")?;
        let payload = QrPayload::parse(raw_payload)?;

        if !paths::is_valid_key(&payload.session_id) {
            return Err(AppError::malformed(
                "session id contains characters that cannot be stored",
            ));
        }

        let student_name = ctx
            .display_name()
            .map(str::to_owned)
            .unwrap_or_else(|| display_name_for(&student.email));

        let record = AttendanceRecord {
            student_id: student.uid.clone(),
            student_name,
            lecture: payload.lecture,
            timestamp: timestamp::now(),
        };

        let path = paths::attendance(&payload.session_id, &student.uid);
        write_as(&*self.store, &path, &record).await?;
        tracing::info!(
            session_id = %payload.session_id,
            student_id = %record.student_id,
            "attendance recorded"
        );

        Ok(CheckIn {
            session_id: payload.session_id,
            record,
        })
    }

    /// Every record stored for `session_id`, ordered by student id.
    pub async fn records_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        if !paths::is_valid_key(session_id) {
            return Err(AppError::Validation(format!(
                "'{session_id}' is not a valid session id"
            )));
        }

        let parent = paths::session_attendance(session_id);
        let children = self.store.children(&parent).await?;

        children
            .into_iter()
            .map(|(key, value)| {
                serde_json::from_value(value).map_err(|source| {
                    AppError::from(StoreError::Decode {
                        path: format!("{parent}/{key}"),
                        source,
                    })
                })
            })
            .collect()
    }
}

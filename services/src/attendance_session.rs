//! Teacher-side session creation.

use std::sync::Arc;

use db::models::{AttendanceSession, Role, SessionStatus};
use db::store::{DocumentStore, write_as};
use db::{paths, timestamp};
use uuid::Uuid;

use crate::context::SessionContext;
use crate::error::AppError;
use crate::qr::QrPayload;

/// A stored session together with the payload to put in its QR code.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedSession {
    pub session: AttendanceSession,
    pub payload: QrPayload,
}

impl CreatedSession {
    pub fn qr_text(&self) -> String {
        self.payload.to_text()
    }
}

pub struct AttendanceSessionService {
    store: Arc<dyn DocumentStore>,
}

impl AttendanceSessionService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Opens a new attendance session for `lecture_name`.
    ///
    /// Only teachers may call this, and nothing is written when the role
    /// check or the lecture name check fails. The session id is a random v4
    /// UUID and doubles as the session's document key.
    pub async fn create_session(
        &self,
        ctx: &SessionContext,
        lecture_name: &str,
    ) -> Result<CreatedSession, AppError> {
        let teacher = ctx.require_role(Role::Teacher, "start attendance sessions")?;

        let lecture = lecture_name.trim();
        if lecture.is_empty() {
            return Err(AppError::Validation("Please enter a lecture name.".into()));
        }

        let session = AttendanceSession {
            session_id: Uuid::new_v4().to_string(),
            lecture: lecture.to_owned(),
            teacher_id: teacher.uid.clone(),
            start_time: timestamp::now(),
            status: SessionStatus::Active,
        };

        write_as(&*self.store, &paths::session(&session.session_id), &session).await?;
        tracing::info!(
            session_id = %session.session_id,
            teacher_id = %session.teacher_id,
            lecture = %session.lecture,
            "attendance session created"
        );

        let payload = QrPayload::new(&session.session_id, &session.lecture);
        Ok(CreatedSession { session, payload })
    }
}

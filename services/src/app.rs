//! The attendance client as one object.
//!
//! [`AttendanceApp`] wires the auth provider, the document store and the
//! anomaly service to the [`Coordinator`]. Every action method is a UI
//! entry point: it runs one operation, logs failures, and reports the
//! outcome through the [`UiSink`]. No error escapes an action.

use std::sync::Arc;

use db::models::{AttendanceRecord, Role};
use db::store::DocumentStore;
use tokio::sync::broadcast;

use crate::anomaly_service::AnomalyService;
use crate::attendance_record::{AttendanceRecordService, CheckIn};
use crate::attendance_session::{AttendanceSessionService, CreatedSession};
use crate::auth::{AuthEvent, AuthProvider};
use crate::context::SessionContext;
use crate::coordinator::Coordinator;
use crate::error::AppError;
use crate::router::Page;
use crate::ui::{Level, StatusTarget, UiEffect, UiSink};
use crate::user_service::{SignInRequest, SignUpRequest, UserService};
use crate::util_service::UtilService;

pub struct AttendanceApp {
    auth: Arc<dyn AuthProvider>,
    users: Arc<UserService>,
    sessions: AttendanceSessionService,
    records: AttendanceRecordService,
    anomalies: AnomalyService,
    util: UtilService,
    coordinator: Coordinator,
    ui: UiSink,
}

impl AttendanceApp {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
        anomalies: AnomalyService,
        ui: UiSink,
        page: Page,
    ) -> Self {
        let users = Arc::new(UserService::new(auth.clone(), store.clone()));
        Self {
            coordinator: Coordinator::new(users.clone(), ui.clone(), page),
            sessions: AttendanceSessionService::new(store.clone()),
            records: AttendanceRecordService::new(store.clone()),
            util: UtilService::new(store),
            auth,
            users,
            anomalies,
            ui,
        }
    }

    /// Identity changes to feed back into [`AttendanceApp::on_auth_event`].
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth.subscribe()
    }

    pub async fn on_auth_event(&mut self, event: AuthEvent) {
        self.coordinator.handle_auth_event(event).await;
    }

    pub fn context(&self) -> SessionContext {
        self.coordinator.context()
    }

    pub fn page(&self) -> &Page {
        self.coordinator.page()
    }

    pub fn open(&mut self, page: Page) {
        self.coordinator.navigate(page);
    }

    fn report(&self, target: StatusTarget, action: &str, err: &AppError) {
        tracing::warn!(action, error = %err, "action failed");
        self.ui.status(target, Level::Error, err.to_string());
    }

    pub async fn sign_up(&mut self, email: &str, password: &str, role: Option<Role>) {
        let req = SignUpRequest::new(email, password, role);
        match self.users.sign_up(req).await {
            Ok((identity, role)) => {
                self.ui.alert(format!("Registered as {role}. You are now signed in."));
                self.coordinator.after_auth(identity, role);
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-up failed");
                self.ui.alert(e.to_string());
            }
        }
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) {
        let req = SignInRequest::new(email, password);
        match self.users.sign_in(req).await {
            Ok((identity, role)) => {
                self.ui.alert("Signed in successfully.");
                self.coordinator.after_auth(identity, role);
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-in failed");
                self.ui.alert(e.to_string());
            }
        }
    }

    pub async fn sign_out(&mut self) {
        match self.users.sign_out().await {
            Ok(()) => {
                self.ui.alert("Signed out successfully.");
                self.coordinator.after_sign_out();
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-out failed");
                self.ui.alert(format!("Sign-out failed: {e}"));
            }
        }
    }

    pub async fn create_session(&mut self, lecture_name: &str) -> Option<CreatedSession> {
        let ctx = self.coordinator.context();
        match self.sessions.create_session(&ctx, lecture_name).await {
            Ok(created) => {
                self.ui.status(
                    StatusTarget::Session,
                    Level::Success,
                    format!("Session saved: {}", created.session.session_id),
                );
                self.ui.emit(UiEffect::RenderQr(created.qr_text()));
                Some(created)
            }
            Err(AppError::Validation(msg)) => {
                self.ui.alert(msg);
                None
            }
            Err(e) => {
                self.report(StatusTarget::Session, "create_session", &e);
                None
            }
        }
    }

    /// Handles one decoded QR code from the scanner.
    pub async fn check_in(&mut self, raw_payload: &str) -> Option<CheckIn> {
        let ctx = self.coordinator.context();
        match self.records.record_attendance(&ctx, raw_payload).await {
            Ok(check_in) => {
                let lecture = check_in.record.lecture.as_deref().unwrap_or("-");
                self.ui.status(
                    StatusTarget::CheckIn,
                    Level::Success,
                    format!(
                        "Attendance confirmed: {} ({})",
                        lecture, check_in.record.student_name
                    ),
                );
                Some(check_in)
            }
            Err(e) => {
                self.report(StatusTarget::CheckIn, "check_in", &e);
                None
            }
        }
    }

    pub async fn detect_anomalies(&mut self, session_id: Option<&str>) {
        let ctx = self.coordinator.context();
        if let Err(e) = ctx.require_role(Role::Teacher, "run anomaly detection") {
            self.ui.alert(e.to_string());
            return;
        }

        self.ui.status(
            StatusTarget::Anomaly,
            Level::Pending,
            "Running anomaly detection...",
        );
        match self.anomalies.detect_anomalies(&ctx, session_id).await {
            Ok(report) => {
                self.ui.status(
                    StatusTarget::Anomaly,
                    Level::Success,
                    format!(
                        "Analysis complete: {} anomalies detected.",
                        report.anomaly_count
                    ),
                );
                self.ui.emit(UiEffect::AnomalyReport(report));
            }
            Err(e) => self.report(StatusTarget::Anomaly, "detect_anomalies", &e),
        }
    }

    pub async fn list_records(&self, session_id: &str) -> Vec<AttendanceRecord> {
        match self.records.records_for_session(session_id).await {
            Ok(records) => records,
            Err(e) => {
                self.report(StatusTarget::General, "list_records", &e);
                Vec::new()
            }
        }
    }

    pub async fn probe(&self) {
        match self.util.write_diagnostic(None).await {
            Ok(key) => self
                .ui
                .alert(format!("Diagnostic record written to the store ({key}).")),
            Err(e) => {
                tracing::warn!(error = %e, "connectivity probe failed");
                self.ui.alert(format!("Error: {e}"));
            }
        }
    }

    pub async fn health(&self) {
        match self.anomalies.health().await {
            Ok(health) => self.ui.status(
                StatusTarget::Anomaly,
                Level::Info,
                format!("Anomaly service status: {}", health.status),
            ),
            Err(e) => self.report(StatusTarget::Anomaly, "health", &e),
        }
    }
}

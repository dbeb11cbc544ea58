//! Error taxonomy shared by every client operation.
//!
//! Each action in [`crate::app::AttendanceApp`] catches these, logs them and
//! turns them into a status message; nothing is retried.

use db::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad local input (empty fields, short password, missing role).
    #[error("{0}")]
    Validation(String),

    /// The caller's resolved role does not allow the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("This email address is already in use.")]
    DuplicateIdentity,

    #[error("Password is too weak (minimum 6 characters).")]
    WeakCredential,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// Any other rejection from the auth provider.
    #[error("Authentication provider error: {0}")]
    Provider(String),

    /// A scanned QR payload that does not follow the attendance schema.
    #[error("Invalid QR code format: {0}")]
    MalformedPayload(String),

    /// The anomaly service answered with a non-success status.
    #[error("Anomaly service returned HTTP {status}: {reason}")]
    ServiceError { status: u16, reason: String },

    /// The anomaly service could not be reached at all.
    #[error("Anomaly service is unreachable. Make sure it is running at {url}")]
    ServiceUnreachable { url: String },

    /// The anomaly service answered 2xx with a body we cannot read.
    #[error("Anomaly service sent an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        AppError::PermissionDenied(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        AppError::MalformedPayload(msg.into())
    }
}


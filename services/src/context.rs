//! Who is signed in, as seen by the rest of the client.
//!
//! The [`crate::coordinator::Coordinator`] is the only writer of the
//! authoritative [`SessionContext`]; components receive a snapshot with
//! every call.

use db::models::Role;

use crate::error::AppError;

/// Fallback display name when an email has nothing before the `@`.
pub const UNKNOWN_USER: &str = "Unknown user";

/// An identity issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    identity: Option<Identity>,
    display_name: Option<String>,
    role: Option<Role>,
}

/// The part of `email` before the first `@`.
pub fn display_name_for(email: &str) -> String {
    match email.split('@').next() {
        Some(local) if !local.is_empty() => local.to_owned(),
        _ => UNKNOWN_USER.to_owned(),
    }
}

impl SessionContext {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: Identity, role: Role) -> Self {
        let display_name = display_name_for(&identity.email);
        Self {
            identity: Some(identity),
            display_name: Some(display_name),
            role: Some(role),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Returns the identity when the caller holds `role`, otherwise
    /// `PermissionDenied` naming what was attempted.
    pub fn require_role(&self, role: Role, action: &str) -> Result<&Identity, AppError> {
        match (&self.identity, self.role) {
            (Some(identity), Some(r)) if r == role => Ok(identity),
            _ => Err(AppError::permission_denied(format!(
                "only signed-in {role}s can {action}"
            ))),
        }
    }

    /// Text for the login status line.
    pub fn login_status(&self) -> String {
        match (&self.display_name, self.role) {
            (Some(name), Some(role)) => {
                format!("Session: {} ({})", name, role.to_string().to_uppercase())
            }
            _ => "Please sign in".to_owned(),
        }
    }
}

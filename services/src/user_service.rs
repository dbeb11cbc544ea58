//! Identity resolver: sign-up, sign-in, sign-out and role lookup.
//!
//! Navigation is not done here. Callers hand the returned role to the
//! [`crate::coordinator::Coordinator`], which applies the post-auth landing
//! rule.

use std::sync::Arc;

use common::format_validation_errors;
use db::models::{Role, UserProfile};
use db::store::{DocumentStore, write_as};
use db::{paths, timestamp};
use validator::Validate;

use crate::auth::AuthProvider;
use crate::context::Identity;
use crate::error::AppError;

#[derive(Debug, Clone, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(required(message = "Please choose a role"))]
    pub role: Option<Role>,
}

impl SignUpRequest {
    pub fn new(email: &str, password: &str, role: Option<Role>) -> Self {
        Self {
            email: email.trim().to_owned(),
            password: password.to_owned(),
            role,
        }
    }
}

#[derive(Debug, Clone, Validate)]
pub struct SignInRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl SignInRequest {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_owned(),
            password: password.to_owned(),
        }
    }
}

fn validate(req: &impl Validate) -> Result<(), AppError> {
    req.validate()
        .map_err(|errors| AppError::Validation(format_validation_errors(&errors)))
}

pub struct UserService {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
}

impl UserService {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self { auth, store }
    }

    /// Creates the identity, then its role record at `users/{uid}`.
    ///
    /// If the role record cannot be written the identity still exists and
    /// later resolves to the default role.
    pub async fn sign_up(&self, req: SignUpRequest) -> Result<(Identity, Role), AppError> {
        validate(&req)?;
        let role = req
            .role
            .ok_or_else(|| AppError::Validation("Please choose a role".into()))?;

        let identity = self.auth.create_user(&req.email, &req.password).await?;

        let profile = UserProfile {
            email: identity.email.clone(),
            role,
            created_at: timestamp::now(),
        };
        write_as(&*self.store, &paths::user(&identity.uid), &profile).await?;

        tracing::info!(uid = %identity.uid, %role, "user registered");
        Ok((identity, role))
    }

    pub async fn sign_in(&self, req: SignInRequest) -> Result<(Identity, Role), AppError> {
        validate(&req)?;
        let identity = self.auth.sign_in(&req.email, &req.password).await?;
        let role = self.resolve_role(&identity.uid).await?;
        Ok((identity, role))
    }

    pub async fn sign_out(&self) -> Result<(), AppError> {
        self.auth.sign_out().await?;
        Ok(())
    }

    /// Reads the stored role for `uid`.
    ///
    /// A missing record, or one whose role is not recognised, resolves to
    /// [`Role::Student`]. Store failures are returned as errors.
    pub async fn resolve_role(&self, uid: &str) -> Result<Role, AppError> {
        let Some(doc) = self.store.get(&paths::user(uid)).await? else {
            tracing::warn!(%uid, "no role record, defaulting to student");
            return Ok(Role::Student);
        };

        let role = doc
            .get("role")
            .and_then(|r| r.as_str())
            .and_then(|r| r.parse::<Role>().ok());

        match role {
            Some(role) => Ok(role),
            None => {
                tracing::warn!(%uid, record = %doc, "unreadable role, defaulting to student");
                Ok(Role::Student)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::DbAuthProvider;
    use db::store::{MemoryStore, read_as};
    use db::test_utils::setup_test_db;
    use serde_json::json;

    async fn service() -> (UserService, Arc<MemoryStore>) {
        let auth = Arc::new(DbAuthProvider::new(setup_test_db().await));
        let store = Arc::new(MemoryStore::new());
        (UserService::new(auth, store.clone()), store)
    }

    #[tokio::test]
    async fn sign_up_writes_role_record() {
        let (users, store) = service().await;

        let (identity, role) = users
            .sign_up(SignUpRequest::new("hoca@uni.edu", "secret1", Some(Role::Teacher)))
            .await
            .unwrap();

        assert_eq!(role, Role::Teacher);
        let profile: UserProfile = read_as(&*store, &paths::user(&identity.uid))
            .await
            .unwrap()
            .expect("role record");
        assert_eq!(profile.email, "hoca@uni.edu");
        assert_eq!(profile.role, Role::Teacher);
    }

    #[tokio::test]
    async fn sign_up_validates_before_contacting_provider() {
        let (users, store) = service().await;

        let err = users
            .sign_up(SignUpRequest::new("", "123", None))
            .await
            .unwrap_err();

        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("Email is required"));
                assert!(msg.contains("at least 6"));
                assert!(msg.contains("role"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_email_is_reported() {
        let (users, _) = service().await;
        users
            .sign_up(SignUpRequest::new("a@uni.edu", "secret1", Some(Role::Student)))
            .await
            .unwrap();

        let err = users
            .sign_up(SignUpRequest::new("a@uni.edu", "secret2", Some(Role::Student)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn sign_in_resolves_stored_role() {
        let (users, _) = service().await;
        users
            .sign_up(SignUpRequest::new("t@uni.edu", "secret1", Some(Role::Teacher)))
            .await
            .unwrap();
        users.sign_out().await.unwrap();

        let (_, role) = users
            .sign_in(SignInRequest::new("t@uni.edu", "secret1"))
            .await
            .unwrap();
        assert_eq!(role, Role::Teacher);

        let err = users
            .sign_in(SignInRequest::new("t@uni.edu", "nope!!"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        let err = users
            .sign_in(SignInRequest::new("  ", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_or_unreadable_role_defaults_to_student() {
        let (users, store) = service().await;

        assert_eq!(users.resolve_role("ghost").await.unwrap(), Role::Student);

        store
            .set(&paths::user("odd"), json!({"email": "x@uni.edu", "role": "admin"}))
            .await
            .unwrap();
        assert_eq!(users.resolve_role("odd").await.unwrap(), Role::Student);

        store
            .set(&paths::user("t"), json!({"email": "t@uni.edu", "role": "teacher"}))
            .await
            .unwrap();
        assert_eq!(users.resolve_role("t").await.unwrap(), Role::Teacher);
    }
}

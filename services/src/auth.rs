//! Auth provider seam.
//!
//! [`AuthProvider`] is the slice of an email/password identity service the
//! client relies on: create, sign in, sign out, and a subscription to
//! identity changes. [`DbAuthProvider`] implements it over the local
//! `accounts` table.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use async_trait::async_trait;
use db::models::account::{self, Entity as AccountEntity};
use rand::rngs::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
};
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use crate::context::Identity;
use crate::error::AppError;

/// Shortest password the provider accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

const EVENT_CAPACITY: usize = 32;

/// Identity transition published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Identity),
    TokenRefreshed(Identity),
    SignedOut,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("email already in use")]
    EmailInUse,
    #[error("password rejected as too weak")]
    WeakPassword,
    #[error("unknown email or wrong password")]
    InvalidCredentials,
    #[error("{0}")]
    Backend(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailInUse => AppError::DuplicateIdentity,
            AuthError::WeakPassword => AppError::WeakCredential,
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Backend(msg) => AppError::Provider(msg),
        }
    }
}

impl From<DbErr> for AuthError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            // Another sign-up claimed the email between our lookup and insert.
            Some(SqlErr::UniqueConstraintViolation(_)) => AuthError::EmailInUse,
            _ => AuthError::Backend(err.to_string()),
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Registers a new identity and signs it in.
    async fn create_user(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn current_user(&self) -> Option<Identity>;

    /// Receives every identity transition from now on.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

pub struct DbAuthProvider {
    db: DatabaseConnection,
    current: RwLock<Option<Identity>>,
    events: broadcast::Sender<AuthEvent>,
}

impl DbAuthProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            db,
            current: RwLock::new(None),
            events,
        }
    }

    /// Re-announces the signed-in identity, as a token refresh would.
    pub async fn refresh(&self) {
        if let Some(identity) = self.current.read().await.clone() {
            self.publish(AuthEvent::TokenRefreshed(identity));
        }
    }

    fn publish(&self, event: AuthEvent) {
        // No subscribers is fine; nobody is watching yet.
        let _ = self.events.send(event);
    }

    async fn set_current(&self, identity: Identity) {
        *self.current.write().await = Some(identity.clone());
        self.publish(AuthEvent::SignedIn(identity));
    }

    fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Backend(format!("password hashing failed: {e}")))
    }

    fn verify_password(account: &account::Model, password: &str) -> bool {
        let parsed = match PasswordHash::new(&account.password_hash) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<account::Model>, AuthError> {
        Ok(AccountEntity::find()
            .filter(account::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }
}

#[async_trait]
impl AuthProvider for DbAuthProvider {
    async fn create_user(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = Self::normalize(email);
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        if self.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailInUse);
        }

        let row = account::ActiveModel {
            uid: Set(Uuid::new_v4().simple().to_string()),
            email: Set(email),
            password_hash: Set(Self::hash_password(password)?),
            created_at: Set(db::timestamp::now()),
        }
        .insert(&self.db)
        .await?;

        let identity = Identity {
            uid: row.uid,
            email: row.email,
        };
        tracing::info!(uid = %identity.uid, "account created");
        self.set_current(identity.clone()).await;
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = Self::normalize(email);
        let account = self
            .find_by_email(&email)
            .await?
            .filter(|a| Self::verify_password(a, password))
            .ok_or(AuthError::InvalidCredentials)?;

        let identity = Identity {
            uid: account.uid,
            email: account.email,
        };
        tracing::info!(uid = %identity.uid, "signed in");
        self.set_current(identity.clone()).await;
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.current.write().await.take();
        if let Some(identity) = previous {
            tracing::info!(uid = %identity.uid, "signed out");
        }
        self.publish(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_user(&self) -> Option<Identity> {
        self.current.read().await.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::test_utils::setup_test_db;

    async fn provider() -> DbAuthProvider {
        DbAuthProvider::new(setup_test_db().await)
    }

    #[tokio::test]
    async fn create_user_signs_in_and_announces_it() {
        let auth = provider().await;
        let mut events = auth.subscribe();

        let identity = auth.create_user(" Zeynep@Uni.edu ", "hunter22").await.unwrap();

        assert_eq!(identity.email, "zeynep@uni.edu");
        assert_eq!(auth.current_user().await, Some(identity.clone()));
        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedIn(identity));
    }

    #[tokio::test]
    async fn create_user_rejects_duplicates_and_weak_passwords() {
        let auth = provider().await;
        auth.create_user("a@uni.edu", "secret1").await.unwrap();

        assert!(matches!(
            auth.create_user("A@uni.edu", "secret2").await,
            Err(AuthError::EmailInUse)
        ));
        assert!(matches!(
            auth.create_user("b@uni.edu", "12345").await,
            Err(AuthError::WeakPassword)
        ));
    }

    #[tokio::test]
    async fn sign_in_checks_the_password_hash() {
        let auth = provider().await;
        let created = auth.create_user("c@uni.edu", "correct horse").await.unwrap();
        auth.sign_out().await.unwrap();

        assert!(matches!(
            auth.sign_in("c@uni.edu", "wrong horse").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in("nobody@uni.edu", "correct horse").await,
            Err(AuthError::InvalidCredentials)
        ));

        let signed_in = auth.sign_in("c@uni.edu", "correct horse").await.unwrap();
        assert_eq!(signed_in, created);
    }

    #[tokio::test]
    async fn sign_out_and_refresh_publish_events() {
        let auth = provider().await;
        let identity = auth.create_user("d@uni.edu", "secret1").await.unwrap();
        let mut events = auth.subscribe();

        auth.refresh().await;
        auth.sign_out().await.unwrap();
        auth.refresh().await;

        assert_eq!(
            events.recv().await.unwrap(),
            AuthEvent::TokenRefreshed(identity)
        );
        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedOut);
        assert!(events.try_recv().is_err());
        assert_eq!(auth.current_user().await, None);
    }

    #[tokio::test]
    async fn concurrent_sign_ups_for_one_email_report_email_in_use() {
        let auth = provider().await;

        let (a, b) = tokio::join!(
            auth.create_user("dup@uni.edu", "secret1"),
            auth.create_user("dup@uni.edu", "secret2"),
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(AuthError::EmailInUse))),
            "{results:?}"
        );
    }

    #[test]
    fn provider_errors_map_onto_app_errors() {
        assert!(matches!(
            AppError::from(AuthError::EmailInUse),
            AppError::DuplicateIdentity
        ));
        assert!(matches!(
            AppError::from(AuthError::WeakPassword),
            AppError::WeakCredential
        ));
        assert!(matches!(
            AppError::from(AuthError::Backend("down".into())),
            AppError::Provider(_)
        ));
    }
}

//! Single consumer of identity changes.
//!
//! The coordinator owns the authoritative [`SessionContext`] and the page
//! the front end is showing. Auth events and post-auth landings update the
//! context, and every change re-runs the router for the current page.

use std::sync::Arc;

use db::models::Role;

use crate::auth::AuthEvent;
use crate::context::{Identity, SessionContext};
use crate::router::{Activation, Page, RouteDecision, landing, route};
use crate::ui::{Level, StatusTarget, UiEffect, UiSink};
use crate::user_service::UserService;

/// Upper bound on chained redirects for one evaluation.
const MAX_REDIRECTS: usize = 4;

pub struct Coordinator {
    users: Arc<UserService>,
    ui: UiSink,
    ctx: SessionContext,
    page: Page,
}

impl Coordinator {
    pub fn new(users: Arc<UserService>, ui: UiSink, page: Page) -> Self {
        Self {
            users,
            ui,
            ctx: SessionContext::signed_out(),
            page,
        }
    }

    /// Snapshot handed to component operations.
    pub fn context(&self) -> SessionContext {
        self.ctx.clone()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub async fn handle_auth_event(&mut self, event: AuthEvent) {
        tracing::debug!(?event, page = %self.page, "auth event");
        match event {
            AuthEvent::SignedIn(identity) | AuthEvent::TokenRefreshed(identity) => {
                let role = self.role_for(&identity).await;
                self.apply(SessionContext::signed_in(identity, role));
            }
            AuthEvent::SignedOut => self.apply(SessionContext::signed_out()),
        }
    }

    /// Applies the post-auth landing rule right after a successful sign-up
    /// or sign-in.
    pub fn after_auth(&mut self, identity: Identity, role: Role) {
        self.ctx = SessionContext::signed_in(identity, role);
        self.ui.emit(UiEffect::LoginStatus(self.ctx.login_status()));

        if let Some(home) = landing(role, &self.page) {
            self.go(home);
        }
        self.evaluate();
    }

    /// Clears the context after a successful sign-out.
    pub fn after_sign_out(&mut self) {
        self.apply(SessionContext::signed_out());
    }

    /// Opens `page` as if the user followed a link to it.
    pub fn navigate(&mut self, page: Page) {
        self.go(page);
        self.evaluate();
    }

    async fn role_for(&self, identity: &Identity) -> Role {
        match self.users.resolve_role(&identity.uid).await {
            Ok(role) => role,
            Err(e) => {
                tracing::error!(uid = %identity.uid, error = %e, "role lookup failed");
                self.ui.status(
                    StatusTarget::General,
                    Level::Error,
                    format!("Could not read your role: {e}"),
                );
                Role::Student
            }
        }
    }

    fn apply(&mut self, next: SessionContext) {
        self.ui.emit(UiEffect::LoginStatus(next.login_status()));
        if next == self.ctx {
            return;
        }

        let signed_out = !next.is_signed_in();
        self.ctx = next;
        if signed_out {
            self.ui.emit(UiEffect::StopScanner);
        }
        self.evaluate();
    }

    fn go(&mut self, page: Page) {
        self.page = page.clone();
        self.ui.emit(UiEffect::Navigate(page));
    }

    fn evaluate(&mut self) {
        for _ in 0..MAX_REDIRECTS {
            match route(&self.ctx, &self.page) {
                RouteDecision::Redirect(page) => self.go(page),
                RouteDecision::Deny {
                    message,
                    stop_scanner,
                } => {
                    if stop_scanner {
                        self.ui.emit(UiEffect::StopScanner);
                    }
                    self.ui.emit(UiEffect::ShowUnauthorized(message.to_owned()));
                    return;
                }
                RouteDecision::Stay(activation) => {
                    match activation {
                        Activation::SignInForm => self.ui.emit(UiEffect::ShowSignInForm),
                        Activation::StartScanner => self.ui.emit(UiEffect::StartScanner),
                        Activation::ShowDashboard => self.ui.emit(UiEffect::ShowDashboard),
                        Activation::Nothing => {}
                    }
                    return;
                }
            }
        }
        tracing::error!(page = %self.page, "redirect limit reached");
    }
}

//! Page/role affinity.
//!
//! Two rules decide where a user belongs:
//!
//! - [`route`] runs whenever the identity changes while a page is open and
//!   enforces the affinity table (redirect, deny, or stay and activate).
//! - [`landing`] runs right after a successful sign-up or sign-in and sends
//!   the user to their role's home page.

use std::fmt;

use db::models::Role;

use crate::context::SessionContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// Sign-in / sign-up form.
    Entry,
    /// Student QR scanner.
    Scan,
    TeacherDashboard,
    Other(String),
}

pub const UNAUTHORIZED_SCAN: &str =
    "Unauthorized: this page is for students only. Please go to teacher.html.";
pub const UNAUTHORIZED_DASHBOARD: &str =
    "Unauthorized access: this page is for teachers only.";

impl Page {
    /// Maps the last segment of a location to a page.
    pub fn from_location(location: &str) -> Self {
        let file = location.rsplit('/').next().unwrap_or_default();
        match file {
            "" | "index.html" => Page::Entry,
            "qr.html" => Page::Scan,
            "teacher.html" => Page::TeacherDashboard,
            other => Page::Other(other.to_owned()),
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            Page::Entry => "index.html",
            Page::Scan => "qr.html",
            Page::TeacherDashboard => "teacher.html",
            Page::Other(name) => name,
        }
    }

    /// Home page of a role.
    pub fn home_of(role: Role) -> Self {
        match role {
            Role::Teacher => Page::TeacherDashboard,
            Role::Student => Page::Scan,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// What a page does once the router lets the user stay on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Show the sign-in form.
    SignInForm,
    StartScanner,
    ShowDashboard,
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Redirect(Page),
    /// Stay on the page but refuse its content. `stop_scanner` is set when
    /// the refused page is the scanner.
    Deny { message: &'static str, stop_scanner: bool },
    Stay(Activation),
}

/// Applies the affinity table for `page` under `ctx`.
pub fn route(ctx: &SessionContext, page: &Page) -> RouteDecision {
    let role = match (ctx.is_signed_in(), ctx.role()) {
        (true, Some(role)) => role,
        _ => {
            return match page {
                Page::Entry => RouteDecision::Stay(Activation::SignInForm),
                _ => RouteDecision::Redirect(Page::Entry),
            };
        }
    };

    match (role, page) {
        (_, Page::Entry) => RouteDecision::Redirect(Page::home_of(role)),
        (Role::Teacher, Page::Scan) => RouteDecision::Deny {
            message: UNAUTHORIZED_SCAN,
            stop_scanner: true,
        },
        (Role::Student, Page::TeacherDashboard) => RouteDecision::Deny {
            message: UNAUTHORIZED_DASHBOARD,
            stop_scanner: false,
        },
        (Role::Student, Page::Scan) => RouteDecision::Stay(Activation::StartScanner),
        (Role::Teacher, Page::TeacherDashboard) => RouteDecision::Stay(Activation::ShowDashboard),
        (_, Page::Other(_)) => RouteDecision::Stay(Activation::Nothing),
    }
}

/// Post-authentication navigation: `Some(home)` unless already there.
pub fn landing(role: Role, page: &Page) -> Option<Page> {
    let home = Page::home_of(role);
    (*page != home).then_some(home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Identity;

    fn ctx(role: Role) -> SessionContext {
        SessionContext::signed_in(
            Identity {
                uid: "u1".into(),
                email: "u1@uni.edu".into(),
            },
            role,
        )
    }

    #[test]
    fn maps_locations_to_pages() {
        assert_eq!(Page::from_location("/"), Page::Entry);
        assert_eq!(Page::from_location("/app/index.html"), Page::Entry);
        assert_eq!(Page::from_location("qr.html"), Page::Scan);
        assert_eq!(Page::from_location("/teacher.html"), Page::TeacherDashboard);
        assert_eq!(
            Page::from_location("/about.html"),
            Page::Other("about.html".into())
        );
    }

    #[test]
    fn entry_redirects_to_role_home() {
        assert_eq!(
            route(&ctx(Role::Teacher), &Page::Entry),
            RouteDecision::Redirect(Page::TeacherDashboard)
        );
        assert_eq!(
            route(&ctx(Role::Student), &Page::Entry),
            RouteDecision::Redirect(Page::Scan)
        );
    }

    #[test]
    fn teacher_on_scan_page_is_denied_and_scanner_stopped() {
        assert_eq!(
            route(&ctx(Role::Teacher), &Page::Scan),
            RouteDecision::Deny {
                message: UNAUTHORIZED_SCAN,
                stop_scanner: true
            }
        );
    }

    #[test]
    fn student_on_dashboard_is_denied() {
        assert_eq!(
            route(&ctx(Role::Student), &Page::TeacherDashboard),
            RouteDecision::Deny {
                message: UNAUTHORIZED_DASHBOARD,
                stop_scanner: false
            }
        );
    }

    #[test]
    fn matching_pages_activate_their_behaviour() {
        assert_eq!(
            route(&ctx(Role::Student), &Page::Scan),
            RouteDecision::Stay(Activation::StartScanner)
        );
        assert_eq!(
            route(&ctx(Role::Teacher), &Page::TeacherDashboard),
            RouteDecision::Stay(Activation::ShowDashboard)
        );
        assert_eq!(
            route(&ctx(Role::Teacher), &Page::Other("help.html".into())),
            RouteDecision::Stay(Activation::Nothing)
        );
    }

    #[test]
    fn anonymous_users_are_sent_to_entry() {
        let anon = SessionContext::signed_out();
        for page in [
            Page::Scan,
            Page::TeacherDashboard,
            Page::Other("x.html".into()),
        ] {
            assert_eq!(route(&anon, &page), RouteDecision::Redirect(Page::Entry));
        }
        assert_eq!(
            route(&anon, &Page::Entry),
            RouteDecision::Stay(Activation::SignInForm)
        );
    }

    #[test]
    fn landing_skips_redirect_when_already_home() {
        assert_eq!(landing(Role::Teacher, &Page::Entry), Some(Page::TeacherDashboard));
        assert_eq!(landing(Role::Teacher, &Page::Scan), Some(Page::TeacherDashboard));
        assert_eq!(landing(Role::Student, &Page::Scan), None);
    }
}

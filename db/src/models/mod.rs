//! Storage models.
//!
//! `account` and `document` are SeaORM entities backing the local SQLite
//! database. The remaining modules are the JSON documents kept in the
//! document store.

pub mod account;
pub mod attendance_record;
pub mod attendance_session;
pub mod diagnostic;
pub mod document;
pub mod user;

pub use account::Entity as Account;
pub use attendance_record::AttendanceRecord;
pub use attendance_session::{AttendanceSession, SessionStatus};
pub use diagnostic::DiagnosticRecord;
pub use document::Entity as Document;
pub use user::{Role, UserProfile};

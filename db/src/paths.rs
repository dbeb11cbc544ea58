//! Document paths used by the attendance client.
//!
//! The layout mirrors the realtime database shared with the anomaly service:
//!
//! - `users/{uid}`                      role record
//! - `yoklamalar/{sessionId}`           attendance session
//! - `katilimlar/{sessionId}/{uid}`     attendance record
//! - `test-yoklamalar/{auto}`           connectivity probe

use chrono::Utc;
use uuid::Uuid;

pub const USERS: &str = "users";
pub const SESSIONS: &str = "yoklamalar";
pub const ATTENDANCE: &str = "katilimlar";
pub const DIAGNOSTICS: &str = "test-yoklamalar";

const FORBIDDEN: [char; 6] = ['/', '.', '#', '$', '[', ']'];

pub fn user(uid: &str) -> String {
    format!("{USERS}/{uid}")
}

pub fn session(session_id: &str) -> String {
    format!("{SESSIONS}/{session_id}")
}

pub fn session_attendance(session_id: &str) -> String {
    format!("{ATTENDANCE}/{session_id}")
}

pub fn attendance(session_id: &str, student_id: &str) -> String {
    format!("{ATTENDANCE}/{session_id}/{student_id}")
}

/// Whether `key` can be used as a single path segment.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(FORBIDDEN) && !key.chars().any(char::is_control)
}

/// Whether every `/`-separated segment of `path` is a valid key.
pub fn is_valid_path(path: &str) -> bool {
    path.split('/').all(is_valid_key)
}

/// Generates a key for an appended child.
///
/// Keys start with the creation time in milliseconds (12 hex digits) so
/// lexicographic order follows insertion order across processes.
pub fn push_key() -> String {
    let millis = Utc::now().timestamp_millis().max(0);
    let entropy = Uuid::new_v4().simple().to_string();
    format!("{:012x}{}", millis, &entropy[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_attendance_paths() {
        assert_eq!(user("u1"), "users/u1");
        assert_eq!(session("S1"), "yoklamalar/S1");
        assert_eq!(session_attendance("S1"), "katilimlar/S1");
        assert_eq!(attendance("S1", "u1"), "katilimlar/S1/u1");
    }

    #[test]
    fn rejects_keys_that_would_escape_their_segment() {
        assert!(is_valid_key("0b8f2d4e-1c3a-4b5d-9e7f-112233445566"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("S1/u2"));
        assert!(!is_valid_key("a.b"));
        assert!(!is_valid_key("$key"));
        assert!(!is_valid_path("katilimlar//u1"));
        assert!(is_valid_path("katilimlar/S1/u1"));
    }

    #[test]
    fn push_keys_are_twenty_chars_and_ordered() {
        let a = push_key();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = push_key();
        assert_eq!(a.len(), 20);
        assert!(is_valid_key(&a));
        assert!(a < b);
    }
}

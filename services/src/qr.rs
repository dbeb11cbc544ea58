//! The QR payload contract between session creation and check-in.
//!
//! Wire format: `{"type":"attendance","id":"<sessionId>","lecture":"<name>"}`.

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

pub const PAYLOAD_TYPE: &str = "attendance";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    pub session_id: String,
    /// Optional on the way in; payloads from other generators may omit it.
    pub lecture: Option<String>,
}

#[derive(Serialize)]
struct Wire<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    lecture: Option<&'a str>,
}

impl QrPayload {
    pub fn new(session_id: impl Into<String>, lecture: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            lecture: Some(lecture.into()),
        }
    }

    /// Serializes to the text embedded in the QR image.
    pub fn to_text(&self) -> String {
        let wire = Wire {
            kind: PAYLOAD_TYPE,
            id: &self.session_id,
            lecture: self.lecture.as_deref(),
        };
        // A struct of strings always serializes.
        serde_json::to_string(&wire).unwrap_or_default()
    }

    /// Parses scanned text, enforcing the attendance schema.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_str(raw.trim())
            .map_err(|_| AppError::malformed("payload is not valid JSON"))?;
        let obj = value
            .as_object()
            .ok_or_else(|| AppError::malformed("payload is not a JSON object"))?;

        if obj.get("type").and_then(Value::as_str) != Some(PAYLOAD_TYPE) {
            return Err(AppError::malformed("payload type is not 'attendance'"));
        }

        let session_id = obj
            .get("id")
            .and_then(scalar_text)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::malformed("payload has no session id"))?;

        let lecture = match obj.get("lecture") {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                scalar_text(value)
                    .ok_or_else(|| AppError::malformed("payload lecture is not text"))?,
            ),
        };

        Ok(Self {
            session_id,
            lecture,
        })
    }
}

/// Strings as-is, numbers in their JSON spelling. Anything else has no text form.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

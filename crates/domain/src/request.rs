//! Player command request and its validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FieldError, ValidationError};

/// A player command submitted to the generate endpoint, with an optional
/// session to continue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl CommandRequest {
    /// Validate an arbitrary JSON body into a `CommandRequest`, collecting
    /// every field violation. `sessionId` may be a string, `null`, or
    /// omitted; `command` must be a non-empty string.
    pub fn from_value(value: &Value) -> Result<CommandRequest, ValidationError> {
        let Some(obj) = value.as_object() else {
            return Err(ValidationError::single("$", "expected a JSON object"));
        };

        let mut errors = Vec::new();

        let command = match obj.get("command") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::String(_)) => {
                errors.push(FieldError::new("command", "命令不能为空"));
                None
            }
            Some(_) => {
                errors.push(FieldError::new("command", "expected a string"));
                None
            }
            None => {
                errors.push(FieldError::new("command", "required"));
                None
            }
        };

        let session_id = match obj.get("sessionId") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(_) => {
                errors.push(FieldError::new("sessionId", "expected a string or null"));
                None
            }
        };

        match command {
            Some(command) if errors.is_empty() => Ok(CommandRequest {
                command,
                session_id,
            }),
            _ => Err(ValidationError::new(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_a_command_with_and_without_session() {
        let bare = CommandRequest::from_value(&json!({"command": "开始游戏"})).expect("valid");
        assert_eq!(bare.command, "开始游戏");
        assert!(bare.session_id.is_none());

        let with_null =
            CommandRequest::from_value(&json!({"command": "向北走", "sessionId": null}))
                .expect("null session is fine");
        assert!(with_null.session_id.is_none());

        let with_id =
            CommandRequest::from_value(&json!({"command": "向北走", "sessionId": "abc"}))
                .expect("valid");
        assert_eq!(with_id.session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn empty_command_cites_the_min_length_violation() {
        let err = CommandRequest::from_value(&json!({"command": ""})).expect_err("too short");
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].field, "command");
        assert_eq!(err.errors[0].message, "命令不能为空");
    }

    #[test]
    fn missing_command_is_required() {
        let err = CommandRequest::from_value(&json!({"sessionId": "abc"})).expect_err("missing");
        assert!(err.errors.iter().any(|e| e.field == "command" && e.message == "required"));
    }

    #[test]
    fn mistyped_session_id_is_a_field_error() {
        let err = CommandRequest::from_value(&json!({"command": "走", "sessionId": 7}))
            .expect_err("bad session id type");
        assert!(err.errors.iter().any(|e| e.field == "sessionId"));
    }
}

//! Event names and payloads exchanged with the installation server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CONNECT: &str = "connect";
pub const DISCONNECT: &str = "disconnect";
pub const SERVER_MESSAGE: &str = "server_message";
pub const TEST_RESPONSE: &str = "test_response";
pub const NEW_EYE_IMAGE_AVAILABLE: &str = "new_eye_image_available";
pub const TRIGGER_FINAL_ANIMATION: &str = "trigger_final_animation";
pub const CONNECTION_STATUS: &str = "connection_status";
pub const KEYBOARD_STATUS: &str = "keyboard_status";

pub const TEST_MESSAGE: &str = "test_message";
pub const REQUEST_EXISTING_EYES: &str = "request_existing_eyes";
pub const REQUEST_STATUS: &str = "request_status";
pub const REQUEST_KEYBOARD_STATUS: &str = "request_keyboard_status";

/// Renders a loosely typed field for a log line: strings verbatim, other
/// JSON values in their compact form.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `server_message` and `test_response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    #[serde(default)]
    pub data: Value,
}

impl TextMessage {
    pub fn text(&self) -> String {
        display_value(&self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EyeImageAvailable {
    pub filename: String,
    /// Set when the server is replaying images captured before this client
    /// connected.
    #[serde(default)]
    pub existing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalAnimationTrigger {
    #[serde(default)]
    pub source: Option<String>,
    /// Whatever the server's hotkey listener reports, string or key code.
    #[serde(default)]
    pub hotkey: Option<Value>,
}

impl FinalAnimationTrigger {
    pub fn source_text(&self) -> String {
        match (self.source.as_deref(), &self.hotkey) {
            (Some("keyboard"), Some(hotkey)) => format!("keyboard ({})", display_value(hotkey)),
            (Some(source), _) => source.to_string(),
            (None, _) => "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    #[serde(default)]
    pub image_processor_ready: bool,
    #[serde(default)]
    pub monitoring_active: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Whether the server's global trigger hotkey is armed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardStatus {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub hotkey: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::{
        EyeImageAvailable, FinalAnimationTrigger, KeyboardStatus, SystemStatus, TestMessage,
        TextMessage,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn eye_image_defaults_to_new() {
        let e: EyeImageAvailable = serde_json::from_value(json!({"filename": "abc.jpg"})).unwrap();
        assert_eq!(
            e,
            EyeImageAvailable {
                filename: "abc.jpg".into(),
                existing: false,
            }
        );
        assert!(serde_json::from_value::<EyeImageAvailable>(json!({})).is_err());
    }

    #[test]
    fn trigger_source_text() {
        let keyboard = FinalAnimationTrigger {
            source: Some("keyboard".into()),
            hotkey: Some(json!("ctrl+shift+f")),
        };
        assert_eq!(keyboard.source_text(), "keyboard (ctrl+shift+f)");
        let key_code: FinalAnimationTrigger =
            serde_json::from_value(json!({"source": "keyboard", "hotkey": 7})).unwrap();
        assert_eq!(key_code.source_text(), "keyboard (7)");
        let remote = FinalAnimationTrigger {
            source: Some("remote".into()),
            hotkey: None,
        };
        assert_eq!(remote.source_text(), "remote");
        assert_eq!(FinalAnimationTrigger::default().source_text(), "unknown");
    }

    #[test]
    fn text_message_renders_non_strings_compactly() {
        let m: TextMessage = serde_json::from_value(json!({"data": {"n": 1}})).unwrap();
        assert_eq!(m.text(), r#"{"n":1}"#);
        let m: TextMessage = serde_json::from_value(json!({"data": "hello"})).unwrap();
        assert_eq!(m.text(), "hello");
    }

    #[test]
    fn status_fields_are_optional() {
        let s: SystemStatus = serde_json::from_value(json!({"monitoring_active": true})).unwrap();
        assert!(!s.image_processor_ready);
        assert!(s.monitoring_active);
        assert_eq!(s.error, None);
    }

    #[test]
    fn keyboard_status_defaults_to_inactive() {
        let k: KeyboardStatus = serde_json::from_value(json!({})).unwrap();
        assert_eq!(k, KeyboardStatus::default());
        let k: KeyboardStatus =
            serde_json::from_value(json!({"active": true, "hotkey": "ctrl+shift+f"})).unwrap();
        assert!(k.active);
        assert_eq!(k.hotkey, Some(json!("ctrl+shift+f")));
    }

    #[test]
    fn test_message_serializes_as_object() {
        let value = serde_json::to_value(TestMessage {
            message: "Hello from client!".into(),
        })
        .unwrap();
        assert_eq!(value, json!({"message": "Hello from client!"}));
    }
}

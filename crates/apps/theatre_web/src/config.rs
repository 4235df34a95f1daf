use channel::ChannelConfig;
use runtime::Journal;
use scene::SceneConfig;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Ids of the page elements the client binds to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub connection_status: String,
    pub canvas_container: String,
    pub eye_images: String,
    pub debug_messages: String,
    pub test_connection: String,
    pub test_animation: String,
    /// Optional elements; absent ones are skipped.
    pub reset_animation: String,
    pub processor_status: String,
    pub monitoring_status: String,
    pub keyboard_status: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            connection_status: "connection-status".into(),
            canvas_container: "three-canvas-container".into(),
            eye_images: "eye-images-container".into(),
            debug_messages: "debug-messages".into(),
            test_connection: "test-connection".into(),
            test_animation: "test-animation".into(),
            reset_animation: "reset-animation".into(),
            processor_status: "processor-status".into(),
            monitoring_status: "monitoring-status".into(),
            keyboard_status: "keyboard-status".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeImageConfig {
    /// Prepended verbatim to the filename the server announces.
    pub path_prefix: String,
    pub class: String,
    pub alt: String,
    /// Class added once the image has loaded.
    pub loaded_class: String,
    pub fade_in_delay_ms: i32,
}

impl Default for EyeImageConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/eyes/".into(),
            class: "eye-image".into(),
            alt: "Eye from audience".into(),
            loaded_class: "loaded".into(),
            fade_in_delay_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub elements: ElementIds,
    pub eye_images: EyeImageConfig,
    pub log_capacity: usize,
    pub status_poll_ms: i32,
    pub heartbeat_check_ms: i32,
    pub test_message: String,
    /// `tracing_subscriber::EnvFilter` directives for the browser console.
    pub log_filter: String,
    pub scene: SceneConfig,
    pub channel: ChannelConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            elements: ElementIds::default(),
            eye_images: EyeImageConfig::default(),
            log_capacity: Journal::DEFAULT_CAPACITY,
            status_poll_ms: 5000,
            heartbeat_check_ms: 1000,
            test_message: "Hello from client!".into(),
            log_filter: "info".into(),
            scene: SceneConfig::default(),
            channel: ChannelConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Parses a JSON override; every omitted field keeps its default.
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        serde_json::from_str(json).map_err(|e| ClientError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::ClientConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(ClientConfig::from_json("{}").unwrap(), ClientConfig::default());
    }

    #[test]
    fn nested_overrides_merge_with_defaults() {
        let cfg = ClientConfig::from_json(
            r#"{"log_capacity": 20, "scene": {"mesh_count": 4}, "channel": {"path": "/ws"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.log_capacity, 20);
        assert_eq!(cfg.scene.mesh_count, 4);
        assert_eq!(cfg.scene.sphere_radius, 3.0);
        assert_eq!(cfg.channel.path, "/ws");
        assert_eq!(cfg.elements.debug_messages, "debug-messages");
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            ClientConfig::from_json("{"),
            Err(crate::error::ClientError::Config(_))
        ));
    }
}

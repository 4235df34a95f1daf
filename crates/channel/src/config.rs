use serde::{Deserialize, Serialize};

/// Where and how the client talks to the Socket.IO server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Server path the Engine.IO endpoint is mounted on.
    pub path: String,
    pub namespace: String,
    /// Emits queued while disconnected; the oldest are dropped beyond this.
    pub max_buffered: usize,
    pub reconnect: ReconnectConfig,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            path: "/socket.io".to_string(),
            namespace: "/".to_string(),
            max_buffered: 100,
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Exponential reconnect schedule. Attempts are unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub delay_ms: u64,
    pub delay_max_ms: u64,
    pub factor: f64,
    /// Fraction of the delay that may be added or removed at random.
    pub randomization: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            delay_max_ms: 5000,
            factor: 2.0,
            randomization: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChannelConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ChannelConfig =
            serde_json::from_str(r#"{"reconnect":{"delay_max_ms":8000}}"#).unwrap();
        assert_eq!(cfg.path, "/socket.io");
        assert_eq!(cfg.namespace, "/");
        assert_eq!(cfg.reconnect.delay_ms, 1000);
        assert_eq!(cfg.reconnect.delay_max_ms, 8000);
    }
}

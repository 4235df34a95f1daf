//! Engine.IO v4 and Socket.IO v5 text packet codec.
//!
//! Every WebSocket text frame is one Engine.IO packet: a single type digit
//! followed by its body. Message packets (`4`) carry a Socket.IO packet:
//!
//! ```text
//! <type>[<attachments>-][/<namespace>,][<ack id>][<json>]
//! ```

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChannelError;

/// Session parameters the server sends in its open packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: u64,
}

impl Handshake {
    /// How long the client may go without hearing from the server.
    pub fn heartbeat_deadline_ms(&self) -> u64 {
        self.ping_interval + self.ping_timeout
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, ChannelError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(ChannelError::EmptyFrame)?;
        let body = chars.as_str();
        match kind {
            '0' => Ok(EnginePacket::Open(serde_json::from_str(body)?)),
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(body.to_string())),
            '3' => Ok(EnginePacket::Pong(body.to_string())),
            '4' => Ok(EnginePacket::Message(body.to_string())),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            // Base64 binary frames only appear on polling transports.
            'b' => Err(ChannelError::BinaryUnsupported),
            other => Err(ChannelError::UnknownPacketType(other.to_string())),
        }
    }

    pub fn encode(&self) -> Result<String, ChannelError> {
        Ok(match self {
            EnginePacket::Open(handshake) => format!("0{}", serde_json::to_string(handshake)?),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{data}"),
            EnginePacket::Pong(data) => format!("3{data}"),
            EnginePacket::Message(data) => format!("4{data}"),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SocketPacketKind {
    Connect,
    Disconnect,
    Event,
    Ack,
    ConnectError,
    BinaryEvent,
    BinaryAck,
}

impl SocketPacketKind {
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '0' => Self::Connect,
            '1' => Self::Disconnect,
            '2' => Self::Event,
            '3' => Self::Ack,
            '4' => Self::ConnectError,
            '5' => Self::BinaryEvent,
            '6' => Self::BinaryAck,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Connect => '0',
            Self::Disconnect => '1',
            Self::Event => '2',
            Self::Ack => '3',
            Self::ConnectError => '4',
            Self::BinaryEvent => '5',
            Self::BinaryAck => '6',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SocketPacket {
    pub kind: SocketPacketKind,
    pub namespace: String,
    pub ack_id: Option<u64>,
    pub data: Option<Value>,
}

impl SocketPacket {
    pub fn connect(namespace: &str) -> Self {
        Self {
            kind: SocketPacketKind::Connect,
            namespace: namespace.to_string(),
            ack_id: None,
            data: None,
        }
    }

    /// An event packet whose data is `[name]` or `[name, payload]`.
    pub fn event(namespace: &str, name: &str, payload: Option<Value>) -> Self {
        let mut args = vec![Value::String(name.to_string())];
        args.extend(payload);
        Self {
            kind: SocketPacketKind::Event,
            namespace: namespace.to_string(),
            ack_id: None,
            data: Some(Value::Array(args)),
        }
    }

    pub fn decode(text: &str) -> Result<Self, ChannelError> {
        let first = text.chars().next().ok_or(ChannelError::EmptyFrame)?;
        let kind = SocketPacketKind::from_char(first)
            .ok_or_else(|| ChannelError::UnknownPacketType(first.to_string()))?;
        if matches!(kind, SocketPacketKind::BinaryEvent | SocketPacketKind::BinaryAck) {
            return Err(ChannelError::BinaryUnsupported);
        }
        let mut rest = &text[first.len_utf8()..];

        let namespace = if rest.starts_with('/') {
            let end = rest.find(',').unwrap_or(rest.len());
            let ns = &rest[..end];
            rest = rest.get(end + 1..).unwrap_or("");
            ns.to_string()
        } else {
            "/".to_string()
        };

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let ack_id = if digits > 0 {
            let id = rest[..digits]
                .parse::<u64>()
                .map_err(|e| ChannelError::Malformed(format!("ack id: {e}")))?;
            Some(id)
        } else {
            None
        };
        rest = &rest[digits..];

        let data = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str(rest)?)
        };

        Ok(Self {
            kind,
            namespace,
            ack_id,
            data,
        })
    }

    pub fn encode(&self) -> Result<String, ChannelError> {
        let mut out = String::new();
        out.push(self.kind.as_char());
        if self.namespace != "/" {
            out.push_str(&self.namespace);
            out.push(',');
        }
        if let Some(id) = self.ack_id {
            let _ = write!(out, "{id}");
        }
        if let Some(data) = &self.data {
            out.push_str(&serde_json::to_string(data)?);
        }
        Ok(out)
    }

    /// Splits an event packet into its name and payload.
    ///
    /// A missing payload is returned as `Value::Null`; extra arguments are
    /// ignored.
    pub fn event_parts(&self) -> Result<(String, Value), ChannelError> {
        if self.kind != SocketPacketKind::Event {
            return Err(ChannelError::Malformed(format!(
                "expected an event packet, got {:?}",
                self.kind
            )));
        }
        let args = match &self.data {
            Some(Value::Array(args)) if !args.is_empty() => args,
            _ => return Err(ChannelError::Malformed("event without arguments".into())),
        };
        let name = args[0]
            .as_str()
            .ok_or_else(|| ChannelError::Malformed("event name is not a string".into()))?;
        let payload = args.get(1).cloned().unwrap_or(Value::Null);
        Ok((name.to_string(), payload))
    }

    /// Human-readable reason carried by a connect error packet.
    pub fn connect_error_message(&self) -> String {
        match &self.data {
            Some(Value::Object(map)) => map
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("connect error")
                .to_string(),
            Some(Value::String(s)) => s.clone(),
            _ => "connect error".to_string(),
        }
    }
}

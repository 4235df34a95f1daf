use std::collections::VecDeque;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ChannelConfig;
use crate::error::ChannelError;
use crate::packet::{EnginePacket, Handshake, SocketPacket, SocketPacketKind};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    /// Transport is up; waiting for the handshake and namespace connect.
    Opening,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    TransportClosed,
    ServerClosed,
    ServerDisconnected,
    HeartbeatTimeout,
}

impl std::fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisconnectReason::TransportClosed => write!(f, "transport close"),
            DisconnectReason::ServerClosed => write!(f, "server close"),
            DisconnectReason::ServerDisconnected => write!(f, "io server disconnect"),
            DisconnectReason::HeartbeatTimeout => write!(f, "ping timeout"),
        }
    }
}

/// What the owner of the transport must do after feeding the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutput {
    /// Write this text frame to the transport.
    Send(String),
    Connected { sid: Option<String> },
    Disconnected(DisconnectReason),
    Event { name: String, payload: Value },
    /// Close the transport; a reconnect should follow.
    CloseTransport,
}

/// Engine.IO/Socket.IO client session over one transport at a time.
///
/// Pure state machine: it never touches a socket or a timer. Times are
/// milliseconds on any monotonic base.
#[derive(Debug)]
pub struct Session {
    namespace: String,
    max_buffered: usize,
    state: SessionState,
    handshake: Option<Handshake>,
    sid: Option<String>,
    last_heard_ms: f64,
    buffered: VecDeque<String>,
}

impl Session {
    pub fn new(config: &ChannelConfig) -> Self {
        Self {
            namespace: config.namespace.clone(),
            max_buffered: config.max_buffered,
            state: SessionState::Disconnected,
            handshake: None,
            sid: None,
            last_heard_ms: 0.0,
            buffered: VecDeque::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn handshake(&self) -> Option<&Handshake> {
        self.handshake.as_ref()
    }

    /// Socket id assigned by the namespace connect reply.
    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    pub fn buffered_len(&self) -> usize {
        self.buffered.len()
    }

    pub fn on_transport_open(&mut self, now_ms: f64) {
        debug!("transport open");
        self.state = SessionState::Opening;
        self.handshake = None;
        self.sid = None;
        self.last_heard_ms = now_ms;
    }

    pub fn on_transport_close(&mut self) -> Vec<SessionOutput> {
        self.lose(DisconnectReason::TransportClosed)
    }

    /// Feeds one inbound text frame.
    ///
    /// Malformed frames return an error and leave the session unchanged apart
    /// from the heartbeat timestamp.
    pub fn on_text(
        &mut self,
        frame: &str,
        now_ms: f64,
    ) -> Result<Vec<SessionOutput>, ChannelError> {
        self.last_heard_ms = now_ms;
        match EnginePacket::decode(frame)? {
            EnginePacket::Open(handshake) => {
                debug!(
                    sid = %handshake.sid,
                    ping_interval = handshake.ping_interval,
                    ping_timeout = handshake.ping_timeout,
                    "engine handshake"
                );
                self.handshake = Some(handshake);
                let connect = SocketPacket::connect(&self.namespace).encode()?;
                Ok(vec![SessionOutput::Send(EnginePacket::Message(connect).encode()?)])
            }
            EnginePacket::Ping(data) => {
                let pong = EnginePacket::Pong(data).encode()?;
                Ok(vec![SessionOutput::Send(pong)])
            }
            EnginePacket::Close => {
                let mut out = self.lose(DisconnectReason::ServerClosed);
                out.push(SessionOutput::CloseTransport);
                Ok(out)
            }
            EnginePacket::Message(body) => self.on_packet(SocketPacket::decode(&body)?),
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => Ok(Vec::new()),
        }
    }

    fn on_packet(&mut self, packet: SocketPacket) -> Result<Vec<SessionOutput>, ChannelError> {
        if packet.namespace != self.namespace {
            debug!(namespace = %packet.namespace, "packet for another namespace ignored");
            return Ok(Vec::new());
        }
        match packet.kind {
            SocketPacketKind::Connect => {
                self.state = SessionState::Connected;
                self.sid = packet
                    .data
                    .as_ref()
                    .and_then(|d| d.get("sid"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                info!(sid = ?self.sid, flushed = self.buffered.len(), "socket connected");
                let mut out: Vec<_> = self.buffered.drain(..).map(SessionOutput::Send).collect();
                out.push(SessionOutput::Connected {
                    sid: self.sid.clone(),
                });
                Ok(out)
            }
            SocketPacketKind::Disconnect => {
                let mut out = self.lose(DisconnectReason::ServerDisconnected);
                out.push(SessionOutput::CloseTransport);
                Ok(out)
            }
            SocketPacketKind::ConnectError => {
                let reason = packet.connect_error_message();
                warn!(%reason, "namespace connect refused");
                Err(ChannelError::ConnectRefused(reason))
            }
            SocketPacketKind::Event => {
                let (name, payload) = packet.event_parts()?;
                if let Some(id) = packet.ack_id {
                    debug!(event = %name, ack_id = id, "server requested an ack; not sent");
                }
                Ok(vec![SessionOutput::Event { name, payload }])
            }
            SocketPacketKind::Ack | SocketPacketKind::BinaryEvent | SocketPacketKind::BinaryAck => {
                debug!(kind = ?packet.kind, "packet ignored");
                Ok(Vec::new())
            }
        }
    }

    /// Encodes an event for sending.
    ///
    /// Returns the frame when connected. Otherwise the frame is queued, to be
    /// flushed in order by the next namespace connect, and `None` is returned.
    pub fn emit(
        &mut self,
        name: &str,
        payload: Option<Value>,
    ) -> Result<Option<String>, ChannelError> {
        let packet = SocketPacket::event(&self.namespace, name, payload).encode()?;
        let frame = EnginePacket::Message(packet).encode()?;
        if self.is_connected() {
            return Ok(Some(frame));
        }
        if self.buffered.len() >= self.max_buffered.max(1) {
            self.buffered.pop_front();
            warn!(event = name, "emit buffer full; dropped oldest");
        }
        debug!(event = name, "emit buffered until connected");
        self.buffered.push_back(frame);
        Ok(None)
    }

    /// Whether the server has been silent for longer than its advertised
    /// `pingInterval + pingTimeout`.
    pub fn heartbeat_expired(&self, now_ms: f64) -> bool {
        match (&self.state, &self.handshake) {
            (SessionState::Disconnected, _) | (_, None) => false,
            (_, Some(h)) => now_ms - self.last_heard_ms > h.heartbeat_deadline_ms() as f64,
        }
    }

    /// Drops the session if the heartbeat has lapsed.
    pub fn check_heartbeat(&mut self, now_ms: f64) -> Vec<SessionOutput> {
        if !self.heartbeat_expired(now_ms) {
            return Vec::new();
        }
        warn!("server heartbeat missed");
        let mut out = self.lose(DisconnectReason::HeartbeatTimeout);
        out.push(SessionOutput::CloseTransport);
        out
    }

    fn lose(&mut self, reason: DisconnectReason) -> Vec<SessionOutput> {
        let was_connected = self.is_connected();
        self.state = SessionState::Disconnected;
        self.handshake = None;
        self.sid = None;
        if was_connected {
            info!(%reason, "socket disconnected");
            vec![SessionOutput::Disconnected(reason)]
        } else {
            Vec::new()
        }
    }
}

use channel::{Backoff, ChannelConfig, ChannelError, Session, SessionOutput, events};
use rand::Rng;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ClientError;

/// The write half of whatever carries text frames to the server.
pub trait Transport {
    fn send(&mut self, frame: &str) -> Result<(), ClientError>;
    fn close(&mut self);
}

/// An event ready for the subscription table.
///
/// Session transitions surface as the pseudo-events `connect` and
/// `disconnect`, the same way server events do.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub name: String,
    pub payload: Value,
}

/// Socket.IO connection: session state, reconnect schedule and transport.
pub struct Connection<T> {
    session: Session,
    backoff: Backoff,
    transport: T,
}

impl<T: Transport> Connection<T> {
    pub fn new(config: &ChannelConfig, transport: T) -> Self {
        Self {
            session: Session::new(config),
            backoff: Backoff::new(&config.reconnect),
            transport,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Fire-and-forget. Queued until connected.
    pub fn emit(&mut self, name: &str, payload: Option<Value>) -> Result<(), ClientError> {
        if let Some(frame) = self.session.emit(name, payload)? {
            self.transport.send(&frame)?;
        }
        Ok(())
    }

    pub fn on_open(&mut self, now_ms: f64) {
        self.session.on_transport_open(now_ms);
    }

    /// Feeds one text frame. Malformed frames are logged and dropped.
    pub fn on_text(&mut self, frame: &str, now_ms: f64) -> Vec<Inbound> {
        match self.session.on_text(frame, now_ms) {
            Ok(outputs) => self.apply(outputs),
            Err(ChannelError::ConnectRefused(reason)) => {
                warn!(%reason, "server refused the connection");
                self.transport.close();
                Vec::new()
            }
            Err(err) => {
                warn!(%err, "dropping frame");
                Vec::new()
            }
        }
    }

    pub fn on_close(&mut self) -> Vec<Inbound> {
        let outputs = self.session.on_transport_close();
        self.apply(outputs)
    }

    pub fn check_heartbeat(&mut self, now_ms: f64) -> Vec<Inbound> {
        let outputs = self.session.check_heartbeat(now_ms);
        self.apply(outputs)
    }

    /// Delay before the next reconnect attempt.
    pub fn next_reconnect_delay_ms<R: Rng>(&mut self, rng: &mut R) -> u64 {
        let delay = self.backoff.next_delay_ms(rng);
        debug!(attempt = self.backoff.attempts(), delay_ms = delay, "reconnect scheduled");
        delay
    }

    fn apply(&mut self, outputs: Vec<SessionOutput>) -> Vec<Inbound> {
        let mut inbound = Vec::new();
        for output in outputs {
            match output {
                SessionOutput::Send(frame) => {
                    if let Err(err) = self.transport.send(&frame) {
                        warn!(%err, "send failed");
                    }
                }
                SessionOutput::Connected { .. } => {
                    self.backoff.reset();
                    inbound.push(Inbound {
                        name: events::CONNECT.to_string(),
                        payload: Value::Null,
                    });
                }
                SessionOutput::Disconnected(reason) => inbound.push(Inbound {
                    name: events::DISCONNECT.to_string(),
                    payload: Value::String(reason.to_string()),
                }),
                SessionOutput::Event { name, payload } => inbound.push(Inbound { name, payload }),
                SessionOutput::CloseTransport => self.transport.close(),
            }
        }
        inbound
    }
}

#[cfg(test)]
mod tests {
    use super::Connection;
    use crate::testing::FakeTransport;
    use channel::ChannelConfig;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    const OPEN: &str = r#"0{"sid":"s","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#;

    fn open(conn: &mut Connection<FakeTransport>) -> Vec<super::Inbound> {
        conn.on_open(0.0);
        conn.on_text(OPEN, 0.0);
        conn.on_text("40", 0.0)
    }

    #[test]
    fn connect_surfaces_as_pseudo_event_and_flushes_buffer() {
        let mut conn = Connection::new(&ChannelConfig::default(), FakeTransport::default());
        conn.emit("request_status", None).unwrap();
        assert!(conn.transport().sent.is_empty());

        let inbound = open(&mut conn);
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].name, "connect");
        assert_eq!(conn.transport().sent, vec!["40", r#"42["request_status"]"#]);
    }

    #[test]
    fn emit_while_connected_sends_immediately() {
        let mut conn = Connection::new(&ChannelConfig::default(), FakeTransport::default());
        open(&mut conn);
        conn.emit("test_message", Some(json!({"message": "hi"}))).unwrap();
        assert_eq!(
            conn.transport().sent.last().map(String::as_str),
            Some(r#"42["test_message",{"message":"hi"}]"#)
        );
    }

    #[test]
    fn malformed_frames_are_dropped() {
        let mut conn = Connection::new(&ChannelConfig::default(), FakeTransport::default());
        open(&mut conn);
        assert!(conn.on_text("42{not an array", 1.0).is_empty());
        assert!(conn.on_text("x", 1.0).is_empty());
        assert!(conn.is_connected());
    }

    #[test]
    fn heartbeat_loss_closes_transport_and_reports_disconnect() {
        let mut conn = Connection::new(&ChannelConfig::default(), FakeTransport::default());
        open(&mut conn);
        let inbound = conn.check_heartbeat(100_000.0);
        assert_eq!(inbound[0].name, "disconnect");
        assert_eq!(inbound[0].payload, json!("ping timeout"));
        assert_eq!(conn.transport().closed, 1);
    }

    #[test]
    fn backoff_resets_after_connect() {
        let cfg = ChannelConfig {
            reconnect: channel::ReconnectConfig {
                randomization: 0.0,
                ..Default::default()
            },
            ..ChannelConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut conn = Connection::new(&cfg, FakeTransport::default());
        assert_eq!(conn.next_reconnect_delay_ms(&mut rng), 1000);
        assert_eq!(conn.next_reconnect_delay_ms(&mut rng), 2000);
        open(&mut conn);
        conn.on_close();
        assert_eq!(conn.next_reconnect_delay_ms(&mut rng), 1000);
    }
}

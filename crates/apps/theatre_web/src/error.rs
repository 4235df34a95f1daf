use channel::ChannelError;
use runtime::ScheduleError;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// A required page element is absent.
    MissingElement(String),
    Dom(String),
    Config(String),
    /// An inbound event payload did not match its expected shape.
    Payload { event: String, reason: String },
    Channel(ChannelError),
    Schedule(ScheduleError),
    Render(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::MissingElement(id) => write!(f, "missing element #{id}"),
            ClientError::Dom(msg) => write!(f, "dom error: {msg}"),
            ClientError::Config(msg) => write!(f, "invalid configuration: {msg}"),
            ClientError::Payload { event, reason } => write!(f, "bad {event} payload: {reason}"),
            ClientError::Channel(err) => write!(f, "channel error: {err}"),
            ClientError::Schedule(err) => write!(f, "{err}"),
            ClientError::Render(msg) => write!(f, "render error: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ChannelError> for ClientError {
    fn from(err: ChannelError) -> Self {
        ClientError::Channel(err)
    }
}

impl From<ScheduleError> for ClientError {
    fn from(err: ScheduleError) -> Self {
        ClientError::Schedule(err)
    }
}

impl From<ClientError> for JsValue {
    fn from(err: ClientError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Wraps a JS exception as a DOM error.
pub(crate) fn dom_err(err: JsValue) -> ClientError {
    ClientError::Dom(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// A frame with no packet type.
    EmptyFrame,
    UnknownPacketType(String),
    /// Structurally invalid packet text.
    Malformed(String),
    /// The JSON body of a packet or event could not be read or written.
    Json(String),
    /// Binary attachments are not supported by this client.
    BinaryUnsupported,
    /// The server refused the namespace connect.
    ConnectRefused(String),
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelError::EmptyFrame => write!(f, "empty frame"),
            ChannelError::UnknownPacketType(t) => write!(f, "unknown packet type: {t}"),
            ChannelError::Malformed(msg) => write!(f, "malformed packet: {msg}"),
            ChannelError::Json(msg) => write!(f, "invalid packet json: {msg}"),
            ChannelError::BinaryUnsupported => write!(f, "binary packets are not supported"),
            ChannelError::ConnectRefused(msg) => write!(f, "namespace connect refused: {msg}"),
        }
    }
}

impl std::error::Error for ChannelError {}

impl From<serde_json::Error> for ChannelError {
    fn from(err: serde_json::Error) -> Self {
        ChannelError::Json(err.to_string())
    }
}

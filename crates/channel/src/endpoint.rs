/// WebSocket endpoint of an Engine.IO v4 server, derived from the page location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub secure: bool,
    pub host: String,
    pub path: String,
}

impl Endpoint {
    /// `protocol` is the page's `location.protocol` (e.g. `"https:"`), `host`
    /// its `location.host` (host plus optional port).
    pub fn from_location(protocol: &str, host: &str, path: &str) -> Self {
        let trimmed = path.trim_matches('/');
        Self {
            secure: protocol.trim_end_matches(':').eq_ignore_ascii_case("https"),
            host: host.to_string(),
            path: format!("/{trimmed}"),
        }
    }

    pub fn url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        let path = self.path.trim_end_matches('/');
        format!("{scheme}://{}{path}/?EIO=4&transport=websocket", self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::Endpoint;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_http_page_uses_ws() {
        let ep = Endpoint::from_location("http:", "localhost:5000", "/socket.io");
        assert_eq!(ep.url(), "ws://localhost:5000/socket.io/?EIO=4&transport=websocket");
    }

    #[test]
    fn https_page_uses_wss_and_normalizes_path() {
        let ep = Endpoint::from_location("https:", "theatre.example", "socket.io/");
        assert!(ep.secure);
        assert_eq!(ep.url(), "wss://theatre.example/socket.io/?EIO=4&transport=websocket");
    }

    #[test]
    fn root_path_is_allowed() {
        let ep = Endpoint::from_location("http:", "h", "/");
        assert_eq!(ep.url(), "ws://h/?EIO=4&transport=websocket");
    }
}

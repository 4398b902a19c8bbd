//! Transport configuration and URL construction.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Configuration for one WebSocket connection to the chat backend.
#[derive(Clone)]
pub struct TransportConfig {
    /// Chat endpoint, e.g. `wss://console.example.com/ws/chat`.
    pub url: String,
    /// Query parameter carrying the credential.
    pub token_param: String,
    /// Upper bound for the WebSocket handshake.
    pub connect_timeout: Duration,
    /// How long `close` waits for the I/O task before aborting it.
    pub close_timeout: Duration,
    /// Interval between outgoing `ping` frames.
    pub heartbeat_interval: Duration,
    /// Inbound silence after which the link is declared dead.
    pub heartbeat_timeout: Duration,
}

impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("url", &self.endpoint())
            .field("token_param", &self.token_param)
            .field("connect_timeout", &self.connect_timeout)
            .field("close_timeout", &self.close_timeout)
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("heartbeat_timeout", &self.heartbeat_timeout)
            .finish()
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000/ws/chat".into(),
            token_param: "token".into(),
            connect_timeout: Duration::from_secs(15),
            close_timeout: Duration::from_secs(2),
            heartbeat_interval: Duration::from_secs(25),
            heartbeat_timeout: Duration::from_secs(60),
        }
    }
}

impl TransportConfig {
    /// Endpoint without any query string, safe to log.
    pub(crate) fn endpoint(&self) -> &str {
        self.url.split('?').next().unwrap_or("")
    }

    /// Full handshake URL with the credential appended as a query parameter.
    pub(crate) fn ws_url(&self, credential: &str) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}={}",
            self.url,
            separator,
            self.token_param,
            utf8_percent_encode(credential, NON_ALPHANUMERIC)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_token_query() {
        let config = TransportConfig {
            url: "wss://console.example.com/ws/chat".into(),
            ..Default::default()
        };
        assert_eq!(
            config.ws_url("abc123"),
            "wss://console.example.com/ws/chat?token=abc123"
        );
    }

    #[test]
    fn extends_existing_query_and_encodes() {
        let config = TransportConfig {
            url: "ws://localhost/ws?tenant=acme".into(),
            token_param: "access_token".into(),
            ..Default::default()
        };
        assert_eq!(
            config.ws_url("a.b/c=d"),
            "ws://localhost/ws?tenant=acme&access_token=a%2Eb%2Fc%3Dd"
        );
    }

    #[test]
    fn debug_never_shows_query() {
        let config = TransportConfig {
            url: "ws://localhost/ws?secret=1".into(),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("ws://localhost/ws"));
        assert!(!debug.contains("secret"));
    }
}

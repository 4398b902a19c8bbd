//! Mapping from the on-disk config to session settings.

use std::time::Duration;

use agentchat_config::AgentChatConfig;
use agentchat_session::{ReconnectPolicy, SessionConfig, TransportConfig};

/// Build the session configuration, letting `url` override `[server] url`.
pub fn session_config(config: &AgentChatConfig, url: Option<&str>) -> SessionConfig {
    let server = &config.server;
    let heartbeat = &config.heartbeat;
    let reconnect = &config.reconnect;

    SessionConfig {
        transport: TransportConfig {
            url: url.unwrap_or(&server.url).to_string(),
            token_param: server.token_param.clone(),
            connect_timeout: Duration::from_secs(server.connect_timeout_secs.into()),
            close_timeout: Duration::from_millis(server.close_timeout_ms.into()),
            heartbeat_interval: Duration::from_secs(heartbeat.interval_secs.into()),
            heartbeat_timeout: Duration::from_secs(heartbeat.timeout_secs.into()),
        },
        reconnect: ReconnectPolicy {
            enabled: reconnect.enabled,
            base_delay: Duration::from_millis(reconnect.base_delay_ms.into()),
            max_delay: Duration::from_millis(reconnect.max_delay_ms.into()),
            max_attempts: reconnect.max_attempts,
        },
    }
}

/// The filter directive: explicit flag first, then the config level.
pub fn log_directive(flag: Option<&str>, config: &AgentChatConfig) -> String {
    flag.map(str::to_string)
        .unwrap_or_else(|| config.logging.level.as_directive().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentchat_config::LogLevel;

    #[test]
    fn defaults_map_onto_session_config() {
        let config = AgentChatConfig::default();
        let session = session_config(&config, None);

        assert_eq!(session.transport.url, config.server.url);
        assert_eq!(session.transport.token_param, "token");
        assert_eq!(session.transport.connect_timeout, Duration::from_secs(15));
        assert_eq!(session.transport.close_timeout, Duration::from_millis(2000));
        assert_eq!(session.transport.heartbeat_interval, Duration::from_secs(25));
        assert_eq!(session.transport.heartbeat_timeout, Duration::from_secs(60));
        assert!(!session.reconnect.enabled);
        assert_eq!(session.reconnect.base_delay, Duration::from_millis(1000));
        assert_eq!(session.reconnect.max_attempts, 5);
    }

    #[test]
    fn url_flag_wins() {
        let config = AgentChatConfig::default();
        let session = session_config(&config, Some("wss://chat.example.test/ws/chat"));
        assert_eq!(session.transport.url, "wss://chat.example.test/ws/chat");
    }

    #[test]
    fn reconnect_section_is_carried() {
        let mut config = AgentChatConfig::default();
        config.reconnect.enabled = true;
        config.reconnect.base_delay_ms = 250;
        config.reconnect.max_delay_ms = 4000;
        config.reconnect.max_attempts = 0;

        let policy = session_config(&config, None).reconnect;
        assert!(policy.enabled);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_delay, Duration::from_millis(4000));
        assert!(policy.allows(100));
    }

    #[test]
    fn log_flag_overrides_config_level() {
        let mut config = AgentChatConfig::default();
        config.logging.level = LogLevel::Warn;
        assert_eq!(log_directive(None, &config), "warn");
        assert_eq!(
            log_directive(Some("agentchat_session=trace"), &config),
            "agentchat_session=trace"
        );
    }
}

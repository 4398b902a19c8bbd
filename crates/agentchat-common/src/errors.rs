use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AgentChatError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("session error: {0}")]
    Session(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("server.url must not be empty".into());
        assert_eq!(
            err.to_string(),
            "config validation error: server.url must not be empty"
        );
    }

    #[test]
    fn agentchat_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: AgentChatError = config_err.into();
        assert!(matches!(err, AgentChatError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn agentchat_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err: AgentChatError = io_err.into();
        assert!(matches!(err, AgentChatError::Io(_)));
        assert!(err.to_string().contains("stdout closed"));
    }

    #[test]
    fn agentchat_error_other_variants() {
        let err = AgentChatError::Network("connection refused".into());
        assert_eq!(err.to_string(), "network error: connection refused");

        let err = AgentChatError::Session("not connected".into());
        assert_eq!(err.to_string(), "session error: not connected");

        let err = AgentChatError::Other("something went wrong".into());
        assert_eq!(err.to_string(), "something went wrong");
    }
}

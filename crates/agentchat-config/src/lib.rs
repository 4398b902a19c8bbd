//! agentchat configuration.
//!
//! TOML-based configuration for the streaming chat client. All sections use
//! serde defaults so a partial (or empty) file works out of the box.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    AgentChatConfig, ChatConfig, HeartbeatConfig, LogLevel, LoggingConfig, ReconnectConfig,
    ServerConfig,
};

use std::path::Path;

use agentchat_common::ConfigError;

/// Load config from `path`, or from the platform default path when `None`,
/// and validate it strictly.
pub fn load_config(path: Option<&Path>) -> Result<AgentChatConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_config_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nurl = \"http://nope\"\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_config_accepts_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.connect_timeout_secs, 15);
        assert_eq!(config.logging.level, LogLevel::Info);
    }
}

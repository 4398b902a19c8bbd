use std::path::PathBuf;

use clap::Parser;

/// agentchat: stream a conversation with an agent backend from the terminal.
///
/// With a MESSAGE, sends it once and exits after the reply. Without one,
/// reads one request per line from stdin.
#[derive(Parser, Debug)]
#[command(name = "agentchat", version, about)]
pub struct Args {
    /// Message to send. Omit to read requests from stdin.
    pub message: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Chat endpoint override (ws:// or wss://).
    #[arg(long)]
    pub url: Option<String>,

    /// Credential presented during the handshake.
    #[arg(long, env = "AGENTCHAT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Agent to address; defaults to `[chat] default_agent_id`.
    #[arg(short, long)]
    pub agent: Option<i64>,

    /// Continue an existing thread.
    #[arg(short, long)]
    pub thread: Option<i64>,

    /// Log filter override (debug, info, warn, error or a full directive).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_flags() {
        let args = Args::try_parse_from([
            "agentchat",
            "--agent",
            "7",
            "--thread",
            "42",
            "--url",
            "wss://example.test/ws/chat",
            "hello there",
        ])
        .unwrap();
        assert_eq!(args.message.as_deref(), Some("hello there"));
        assert_eq!(args.agent, Some(7));
        assert_eq!(args.thread, Some(42));
        assert_eq!(args.url.as_deref(), Some("wss://example.test/ws/chat"));
    }

    #[test]
    fn interactive_when_no_message() {
        let args = Args::try_parse_from(["agentchat", "-a", "3"]).unwrap();
        assert!(args.message.is_none());
        assert_eq!(args.agent, Some(3));
    }

    #[test]
    fn agent_must_be_numeric() {
        assert!(Args::try_parse_from(["agentchat", "--agent", "scout"]).is_err());
    }
}

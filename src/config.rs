//! Bot configuration, loaded from a JSON file at startup.

use anyhow::Context as _;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// IRC server hostname.
    pub server: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub use_tls: bool,

    pub nick: String,
    pub username: String,

    /// Channel to join and announce into.
    pub room: String,

    /// Pattern tested against lowercased author nicks. Authors whose nick
    /// produces a non-empty match are invisible to the bot.
    #[serde(default)]
    pub ignore_regex: String,

    /// Optional announcement sent after joining the room.
    #[serde(default)]
    pub hello_message: Option<String>,

    /// Path to the SQLite database file.
    pub database: String,
}

fn default_port() -> u16 {
    6667
}

impl Config {
    /// Load and parse the config file. Any failure here is fatal; the bot
    /// must not start with a missing or malformed config.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Compile the author ignore pattern once, for injection into the
    /// dispatcher.
    pub fn ignore_pattern(&self) -> crate::Result<Regex> {
        let pattern = Regex::new(&self.ignore_regex)
            .with_context(|| format!("invalid ignore_regex: {:?}", self.ignore_regex))?;
        Ok(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config: Config = serde_json::from_str(
            r##"{
                "server": "irc.libera.chat",
                "port": 6697,
                "use_tls": true,
                "nick": "titlebot",
                "username": "titlebot",
                "room": "#rust",
                "ignore_regex": "otherbot",
                "hello_message": "hello!",
                "database": "titlebot.db"
            }"##,
        )
        .expect("full config should parse");

        assert_eq!(config.port, 6697);
        assert!(config.use_tls);
        assert_eq!(config.hello_message.as_deref(), Some("hello!"));
    }

    #[test]
    fn optional_fields_default() {
        let config: Config = serde_json::from_str(
            r##"{
                "server": "irc.example.net",
                "nick": "titlebot",
                "username": "titlebot",
                "room": "#chat",
                "database": "titlebot.db"
            }"##,
        )
        .expect("minimal config should parse");

        assert_eq!(config.port, 6667);
        assert!(!config.use_tls);
        assert_eq!(config.ignore_regex, "");
        assert!(config.hello_message.is_none());
    }

    #[test]
    fn rejects_invalid_ignore_pattern() {
        let config: Config = serde_json::from_str(
            r##"{
                "server": "irc.example.net",
                "nick": "titlebot",
                "username": "titlebot",
                "room": "#chat",
                "ignore_regex": "[unclosed",
                "database": "titlebot.db"
            }"##,
        )
        .expect("config with bad pattern still parses as JSON");

        assert!(config.ignore_pattern().is_err());
    }
}

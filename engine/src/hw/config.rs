use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "JACKWRAP_CONFIG";
pub const CLIENT_NAME_ENV: &str = "JACKWRAP_CLIENT_NAME";
pub const MIDI_INPUT_ENV: &str = "JACKWRAP_MIDI_INPUT";
pub const NO_START_SERVER_ENV: &str = "JACKWRAP_NO_START_SERVER";
pub const NO_AUTO_CONNECT_ENV: &str = "JACKWRAP_NO_AUTO_CONNECT";

pub const DEFAULT_CLIENT_NAME: &str = "simple";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings of one client connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Requested client name. The server may hand out a different one.
    pub name: String,
    /// Register a MIDI input port next to the audio ports.
    pub midi_input: bool,
    /// Let the client library start a server when none is running.
    pub start_server: bool,
    /// Patch the ports to the first physical capture/playback ports on `run`.
    pub auto_connect: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CLIENT_NAME.to_string(),
            midi_input: false,
            start_server: true,
            auto_connect: true,
        }
    }
}

impl ClientConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_midi_input(mut self, midi_input: bool) -> Self {
        self.midi_input = midi_input;
        self
    }

    pub fn with_start_server(mut self, start_server: bool) -> Self {
        self.start_server = start_server;
        self
    }

    pub fn with_auto_connect(mut self, auto_connect: bool) -> Self {
        self.auto_connect = auto_connect;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Overrides fields from variables returned by `lookup`.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(name) = lookup(CLIENT_NAME_ENV) {
            self.name = name;
        }
        if let Some(value) = lookup(MIDI_INPUT_ENV) {
            self.midi_input = parse_flag(&value);
        }
        if let Some(value) = lookup(NO_START_SERVER_ENV) {
            self.start_server = !parse_flag(&value);
        }
        if let Some(value) = lookup(NO_AUTO_CONNECT_ENV) {
            self.auto_connect = !parse_flag(&value);
        }
        self
    }

    /// Config file named by `JACKWRAP_CONFIG` (or defaults), then environment
    /// overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(base.apply_env(|key| std::env::var(key).ok()))
    }
}

pub fn parse_flag(value: &str) -> bool {
    let s = value.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "yes" || s == "on"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_plain_client() {
        let config = ClientConfig::default();
        assert_eq!(config.name, "simple");
        assert!(!config.midi_input);
        assert!(config.start_server);
        assert!(config.auto_connect);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ClientConfig::from_toml_str("name = \"synth\"\nmidi_input = true\n").unwrap();
        assert_eq!(config.name, "synth");
        assert!(config.midi_input);
        assert!(config.start_server);
    }

    #[test]
    fn bad_toml_is_rejected() {
        assert!(matches!(
            ClientConfig::from_toml_str("midi_input = \"maybe\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_overrides_file_values() {
        let vars = HashMap::from([
            (CLIENT_NAME_ENV, "fx"),
            (MIDI_INPUT_ENV, "yes"),
            (NO_START_SERVER_ENV, "1"),
            (NO_AUTO_CONNECT_ENV, "off"),
        ]);
        let config =
            ClientConfig::default().apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.name, "fx");
        assert!(config.midi_input);
        assert!(!config.start_server);
        assert!(config.auto_connect);
    }

    #[test]
    fn flags_accept_common_spellings() {
        for value in ["1", "true", "YES", " on "] {
            assert!(parse_flag(value), "{value}");
        }
        for value in ["0", "false", "", "nope"] {
            assert!(!parse_flag(value), "{value}");
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ClientConfig::load("/nonexistent/jackwrap.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/jackwrap.toml"));
    }
}

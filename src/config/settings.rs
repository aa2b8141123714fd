use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use crate::net::DEFAULT_MAX_LINE_BYTES;
use crate::shared_types::DEFAULT_ROOM_CODE_LENGTH;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const DEFAULT_LISTEN_BACKLOG: u32 = 1024;

const MIN_ROOM_CODE_LENGTH: usize = 4;
const MAX_ROOM_CODE_LENGTH: usize = 16;

const MIN_LINE_BYTES: usize = 64;

// -----------------------------------------------------------------------------
// ----- Settings --------------------------------------------------------------

/// Tunables read from the optional TOML settings file.
///
/// ```toml
/// [lobby]
/// room_code_length = 6
///
/// [server]
/// max_line_bytes = 4096
/// listen_backlog = 1024
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub lobby: LobbySettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LobbySettings {
    pub room_code_length: usize,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            room_code_length: DEFAULT_ROOM_CODE_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    pub max_line_bytes: usize,
    pub listen_backlog: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            listen_backlog: DEFAULT_LISTEN_BACKLOG,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Settings: Static ------------------------------------------------------

impl Settings {
    /// No path means built-in defaults.
    pub async fn load(path: Option<&Path>) -> Result<Settings, SettingsError> {
        match path {
            Some(path) => Self::from_file_async(path).await,
            None => Ok(Settings::default()),
        }
    }

    pub fn parse(raw: &str) -> Result<Settings, SettingsError> {
        let settings: Settings =
            toml::from_str(raw).map_err(|e| SettingsError::Toml { source: e })?;
        settings.validate()?;
        Ok(settings)
    }
}

// -----------------------------------------------------------------------------
// ----- Settings: Private -----------------------------------------------------

impl Settings {
    async fn from_file_async(path: &Path) -> Result<Settings, SettingsError> {
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| SettingsError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::parse(&raw)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let code_len = self.lobby.room_code_length;
        if !(MIN_ROOM_CODE_LENGTH..=MAX_ROOM_CODE_LENGTH).contains(&code_len) {
            return Err(SettingsError::InvalidField {
                field: "lobby.room_code_length",
                reason: format!(
                    "{code_len} is outside {MIN_ROOM_CODE_LENGTH}..={MAX_ROOM_CODE_LENGTH}"
                ),
            });
        }

        if self.server.max_line_bytes < MIN_LINE_BYTES {
            return Err(SettingsError::InvalidField {
                field: "server.max_line_bytes",
                reason: format!("must be at least {MIN_LINE_BYTES}"),
            });
        }

        if self.server.listen_backlog == 0 {
            return Err(SettingsError::InvalidField {
                field: "server.listen_backlog",
                reason: "must be positive".to_string(),
            });
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("read error for {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("toml parse error: {source}")]
    Toml { source: toml::de::Error },
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

pub mod cli;
pub mod config;
pub mod settings;
pub mod types;

pub use config::Config;
pub use settings::{LobbySettings, ServerSettings, Settings, SettingsError};
pub use types::LogLevel;

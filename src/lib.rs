pub mod admin;
pub mod analytics;
pub mod config;
pub mod errors;
pub mod frontend;
pub mod game;
pub mod lobby;
pub mod net;
pub mod server;
pub mod session;
pub mod shared_types;
pub mod wire;

pub use config::Config;
pub use errors::SessionError;
pub use frontend::PlayerConnection;
pub use session::{ChannelLayer, SessionCoordinator};

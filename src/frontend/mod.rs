pub mod connection;

pub use connection::PlayerConnection;

pub mod color;
pub mod connection_id;
pub mod outcome;
pub mod room_code;

pub use color::Color;
pub use connection_id::ConnectionId;
pub use outcome::Outcome;
pub use room_code::{DEFAULT_ROOM_CODE_LENGTH, RoomCode};

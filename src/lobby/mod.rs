pub mod pool;
pub mod registry;
pub mod room;

pub use pool::{Acquired, MatchmakingPool};
pub use registry::{RoomHandle, RoomRegistry};
pub use room::{Joined, Left, Played, ROOM_CAPACITY, RematchVote, RoomState};

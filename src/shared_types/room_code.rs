use std::sync::Arc;

use rand::Rng;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const DEFAULT_ROOM_CODE_LENGTH: usize = 6;

// -----------------------------------------------------------------------------
// ----- RoomCode --------------------------------------------------------------

/// Short, human-shareable room token (uppercase letters and digits).
/// Cheap to clone; the pool, the registry and every session hold copies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomCode(Arc<str>);

// -----------------------------------------------------------------------------
// ----- RoomCode: Static ------------------------------------------------------

impl RoomCode {
    pub fn random(len: usize) -> Self {
        let mut rng = rand::rng();

        let code: String = (0..len)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect();

        RoomCode(code.into())
    }
}

impl From<&str> for RoomCode {
    fn from(value: &str) -> Self {
        RoomCode(value.into())
    }
}

// -----------------------------------------------------------------------------
// ----- RoomCode: Public ------------------------------------------------------

impl RoomCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

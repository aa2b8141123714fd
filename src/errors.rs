use thiserror::Error;

use crate::shared_types::{ConnectionId, RoomCode};

// -----------------------------------------------------------------------------
// ----- SessionError ----------------------------------------------------------

/// Everything that can go wrong while handling one connection event.
///
/// None of these are fatal. Each variant is recovered where it is raised:
/// either reported privately to the sender (see [`SessionError::client_message`])
/// or swallowed and logged, because it describes an expected race between two
/// players acting at the same time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("malformed payload: {reason}")]
    MalformedPayload { reason: String },

    #[error("cell {index} is already filled")]
    AlreadyFilled { index: usize },

    #[error("cell index {index} is out of range")]
    CellOutOfRange { index: i64 },

    #[error("room {code} is waiting for a second player")]
    NotYetPaired { code: RoomCode },

    #[error("unknown room {code}")]
    UnknownRoom { code: RoomCode },

    #[error("room {code} has no free slot")]
    RoomFull { code: RoomCode },

    #[error("room code {code} is already in use")]
    RoomCodeCollision { code: RoomCode },

    #[error("{conn} is not part of room {code}")]
    UnknownConnection { conn: ConnectionId, code: RoomCode },
}

// -----------------------------------------------------------------------------
// ----- SessionError: Public --------------------------------------------------

impl SessionError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        SessionError::MalformedPayload {
            reason: reason.into(),
        }
    }

    /// Text for the private `error` event, or `None` when the error is an
    /// ordinary race and the sender should not hear about it.
    pub fn client_message(&self) -> Option<String> {
        match self {
            SessionError::MalformedPayload { .. } => Some("Invalid JSON format".to_string()),
            SessionError::CellOutOfRange { index } => {
                Some(format!("Cell index {index} is out of range"))
            }
            SessionError::AlreadyFilled { .. }
            | SessionError::NotYetPaired { .. }
            | SessionError::UnknownRoom { .. }
            | SessionError::RoomFull { .. }
            | SessionError::RoomCodeCollision { .. }
            | SessionError::UnknownConnection { .. } => None,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

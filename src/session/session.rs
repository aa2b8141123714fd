use crate::shared_types::{Color, ConnectionId, RoomCode};
use crate::wire::ServerEvent;

use super::broadcast::Outbox;

// -----------------------------------------------------------------------------
// ----- Session ---------------------------------------------------------------

/// Everything the server knows about one connected player. Built in one piece
/// when the connection is seated and consumed by the disconnect handler.
#[derive(Debug)]
pub struct Session {
    conn: ConnectionId,
    room: RoomCode,
    color: Color,
    outbox: Outbox,
}

impl Session {
    pub(crate) fn new(conn: ConnectionId, room: RoomCode, color: Color, outbox: Outbox) -> Self {
        Self {
            conn,
            room,
            color,
            outbox,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Session: Public -------------------------------------------------------

impl Session {
    pub fn conn(&self) -> ConnectionId {
        self.conn
    }

    pub fn room(&self) -> &RoomCode {
        &self.room
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Private send. A closed connection silently drops the event.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.outbox.send(event).is_ok()
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

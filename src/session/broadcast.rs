use std::collections::HashMap;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::trace;

use crate::shared_types::{ConnectionId, RoomCode};
use crate::wire::ServerEvent;

// -----------------------------------------------------------------------------
// ----- Outbox ----------------------------------------------------------------

/// Private, ordered channel into one connection's writer task.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

// -----------------------------------------------------------------------------
// ----- Broadcaster -----------------------------------------------------------

/// Room-scoped group delivery. Implementations must not block: the
/// coordinator calls these while it holds a room lock so that both occupants
/// observe one room's events in the same order.
pub trait Broadcaster: Send + Sync {
    /// Tag `conn` with `room` so it receives the room's broadcasts.
    fn group_add(&self, room: &RoomCode, conn: ConnectionId, outbox: Outbox);

    fn group_discard(&self, room: &RoomCode, conn: ConnectionId);

    /// Deliver `event` to every connection tagged with `room`. Returns how
    /// many connections accepted it.
    fn group_send(&self, room: &RoomCode, event: &ServerEvent) -> usize;
}

// -----------------------------------------------------------------------------
// ----- ChannelLayer ----------------------------------------------------------

/// In-process group primitive over per-connection unbounded channels.
#[derive(Debug, Default)]
pub struct ChannelLayer {
    groups: RwLock<HashMap<RoomCode, HashMap<ConnectionId, Outbox>>>,
}

impl ChannelLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_count(&self) -> usize {
        self.groups.read().len()
    }
}

impl Broadcaster for ChannelLayer {
    fn group_add(&self, room: &RoomCode, conn: ConnectionId, outbox: Outbox) {
        self.groups
            .write()
            .entry(room.clone())
            .or_default()
            .insert(conn, outbox);
    }

    fn group_discard(&self, room: &RoomCode, conn: ConnectionId) {
        let mut groups = self.groups.write();

        let Some(members) = groups.get_mut(room) else {
            return;
        };

        members.remove(&conn);
        if members.is_empty() {
            groups.remove(room);
        }
    }

    fn group_send(&self, room: &RoomCode, event: &ServerEvent) -> usize {
        let groups = self.groups.read();

        let Some(members) = groups.get(room) else {
            return 0;
        };

        // A closed receiver means the writer task is already gone; its
        // disconnect will untag it.
        let delivered = members
            .values()
            .filter(|outbox| outbox.send(event.clone()).is_ok())
            .count();

        trace!("room {room}: {} delivered to {delivered}", event.kind());
        delivered
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::errors::SessionError;
use crate::shared_types::{DEFAULT_ROOM_CODE_LENGTH, RoomCode};

use super::room::RoomState;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const MAX_MINT_ATTEMPTS: usize = 64;

// -----------------------------------------------------------------------------
// ----- RoomHandle ------------------------------------------------------------

/// Shared handle to one room. The mutex is the room's serialization point.
pub type RoomHandle = Arc<Mutex<RoomState>>;

// -----------------------------------------------------------------------------
// ----- RoomRegistry ----------------------------------------------------------

/// Owns every live room. The map lock is only held long enough to clone a
/// handle in or out; it is never held while a room lock is taken.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomCode, RoomHandle>>,
    code_length: usize,
}

impl RoomRegistry {
    pub fn new(code_length: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            code_length,
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_ROOM_CODE_LENGTH)
    }
}

// -----------------------------------------------------------------------------
// ----- RoomRegistry: Public --------------------------------------------------

impl RoomRegistry {
    /// Register an empty room under `code`. An existing room is never
    /// replaced.
    pub fn create(&self, code: RoomCode) -> Result<RoomHandle, SessionError> {
        let mut rooms = self.rooms.write();

        match rooms.entry(code) {
            Entry::Occupied(entry) => Err(SessionError::RoomCodeCollision {
                code: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                let handle = Arc::new(Mutex::new(RoomState::new(entry.key().clone())));
                entry.insert(handle.clone());
                Ok(handle)
            }
        }
    }

    /// Generate a fresh code and register it, drawing again on collision.
    pub fn mint(&self) -> RoomCode {
        let mut length = self.code_length;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let code = RoomCode::random(length);

            match self.create(code.clone()) {
                Ok(_) => return code,
                Err(err) => debug!("mint attempt {attempt}: {err}"),
            }

            // Only reachable if the code space is close to exhausted.
            if attempt % MAX_MINT_ATTEMPTS == 0 {
                length += 1;
                warn!("room code space crowded; minting {length}-character codes");
            }
        }
    }

    pub fn get(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.read().get(code).cloned()
    }

    /// Drop `code` only while it still maps to `handle`.
    pub fn remove(&self, code: &RoomCode, handle: &RoomHandle) -> bool {
        let mut rooms = self.rooms.write();

        match rooms.get(code) {
            Some(current) if Arc::ptr_eq(current, handle) => {
                rooms.remove(code);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.read().contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.rooms.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.read().is_empty()
    }

    /// Point-in-time copy of one room, for diagnostics and tests.
    pub fn snapshot(&self, code: &RoomCode) -> Option<RoomState> {
        let handle = self.get(code)?;
        let state = handle.lock().clone();
        Some(state)
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

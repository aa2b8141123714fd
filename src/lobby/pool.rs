use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::debug;

use crate::shared_types::RoomCode;

use super::registry::RoomRegistry;

// -----------------------------------------------------------------------------
// ----- MatchmakingPool -------------------------------------------------------

/// FIFO of half-open rooms, i.e. rooms holding (or promised to) exactly one
/// player. The earliest-waiting room is always paired first.
///
/// The pool lock is a leaf with respect to rooms: it is never held while a
/// room lock is acquired. It may nest the registry lock when minting.
#[derive(Debug, Default)]
pub struct MatchmakingPool {
    half_open: Mutex<VecDeque<RoomCode>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquired {
    /// Popped a waiting room; the caller becomes its second occupant.
    Paired(RoomCode),

    /// Nothing was waiting; a new room was registered and queued.
    Minted(RoomCode),
}

impl Acquired {
    pub fn into_code(self) -> RoomCode {
        match self {
            Acquired::Paired(code) | Acquired::Minted(code) => code,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- MatchmakingPool: Static -----------------------------------------------

impl MatchmakingPool {
    pub fn new() -> Self {
        Self::default()
    }
}

// -----------------------------------------------------------------------------
// ----- MatchmakingPool: Public -----------------------------------------------

impl MatchmakingPool {
    /// Pop-or-mint as one atomic step, so two concurrent callers can neither
    /// share a waiting room nor both mint while one was waiting.
    pub fn acquire_room(&self, registry: &RoomRegistry) -> Acquired {
        let mut half_open = self.half_open.lock();

        if let Some(code) = half_open.pop_front() {
            debug!("pairing into waiting room {code}");
            return Acquired::Paired(code);
        }

        let code = registry.mint();
        half_open.push_back(code.clone());
        debug!("opened room {code}");

        Acquired::Minted(code)
    }

    /// Queue a room that just dropped back to one occupant.
    pub fn release_to_half_open(&self, code: &RoomCode) {
        let mut half_open = self.half_open.lock();

        if !half_open.contains(code) {
            half_open.push_back(code.clone());
        }
    }

    pub fn remove(&self, code: &RoomCode) -> bool {
        let mut half_open = self.half_open.lock();
        let before = half_open.len();
        half_open.retain(|c| c != code);
        half_open.len() != before
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.half_open.lock().contains(code)
    }

    pub fn len(&self) -> usize {
        self.half_open.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.half_open.lock().is_empty()
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

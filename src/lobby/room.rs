use std::collections::{HashMap, HashSet};

use crate::errors::SessionError;
use crate::game::Board;
use crate::shared_types::{Color, ConnectionId, Outcome, RoomCode};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

pub const ROOM_CAPACITY: usize = 2;

// -----------------------------------------------------------------------------
// ----- RoomState -------------------------------------------------------------

/// One room's occupants, board and rematch votes.
///
/// Callers hold the room's mutex for the whole of each transition; nothing in
/// here suspends or touches another room. The occupant count is the size of
/// the color map, so a connection can never be counted without a color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomState {
    code: RoomCode,
    colors: HashMap<ConnectionId, Color>,
    board: Option<Board>,
    rematch_votes: HashSet<ConnectionId>,
    closed: bool,
}

impl RoomState {
    pub fn new(code: RoomCode) -> Self {
        Self {
            code,
            colors: HashMap::with_capacity(ROOM_CAPACITY),
            board: None,
            rematch_votes: HashSet::with_capacity(ROOM_CAPACITY),
            closed: false,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- RoomState: Transition Results -----------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Joined {
    pub color: Color,
    pub occupants: usize,
    /// The join filled the room and a fresh game began.
    pub started: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Left {
    pub color: Color,
    pub remaining: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Played {
    pub index: usize,
    pub color: Color,
    /// Set when this move filled the last cell.
    pub result: Option<Outcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RematchVote {
    pub requester: Color,
    pub agreed: usize,
    pub total: usize,
    pub restarted: bool,
}

// -----------------------------------------------------------------------------
// ----- RoomState: Accessors --------------------------------------------------

impl RoomState {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn connection_count(&self) -> usize {
        self.colors.len()
    }

    pub fn color_of(&self, conn: ConnectionId) -> Option<Color> {
        self.colors.get(&conn).copied()
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn rematch_votes(&self) -> usize {
        self.rematch_votes.len()
    }

    pub fn is_full(&self) -> bool {
        self.colors.len() >= ROOM_CAPACITY
    }
}

// -----------------------------------------------------------------------------
// ----- RoomState: Transitions ------------------------------------------------

impl RoomState {
    pub fn join(&mut self, conn: ConnectionId) -> Result<Joined, SessionError> {
        if self.closed {
            return Err(SessionError::UnknownRoom {
                code: self.code.clone(),
            });
        }

        if self.is_full() || self.colors.contains_key(&conn) {
            return Err(SessionError::RoomFull {
                code: self.code.clone(),
            });
        }

        let color = Color::first_available(self.colors.values()).ok_or_else(|| {
            SessionError::RoomFull {
                code: self.code.clone(),
            }
        })?;

        self.colors.insert(conn, color);

        let started = self.is_full();
        if started {
            self.start_game();
        }

        Ok(Joined {
            color,
            occupants: self.colors.len(),
            started,
        })
    }

    /// Always decrements, whether or not a game was running. Dropping below
    /// two players abandons the current board; the next pairing starts fresh.
    pub fn leave(&mut self, conn: ConnectionId) -> Result<Left, SessionError> {
        let color = self
            .colors
            .remove(&conn)
            .ok_or_else(|| SessionError::UnknownConnection {
                conn,
                code: self.code.clone(),
            })?;

        self.rematch_votes.remove(&conn);
        self.board = None;

        let remaining = self.colors.len();
        if remaining == 0 {
            self.closed = true;
        }

        Ok(Left { color, remaining })
    }

    pub fn play(&mut self, conn: ConnectionId, index: i64) -> Result<Played, SessionError> {
        let color = self.require_color(conn)?;

        let Some(board) = self.board.as_mut() else {
            return Err(SessionError::NotYetPaired {
                code: self.code.clone(),
            });
        };

        let index = board.fill(index, color)?;

        Ok(Played {
            index,
            color,
            result: board.winner(),
        })
    }

    pub fn vote_rematch(&mut self, conn: ConnectionId) -> Result<RematchVote, SessionError> {
        let requester = self.require_color(conn)?;

        if !self.is_full() {
            return Err(SessionError::NotYetPaired {
                code: self.code.clone(),
            });
        }

        self.rematch_votes.insert(conn);

        let agreed = self.rematch_votes.len();
        let total = self.colors.len();
        let restarted = agreed == total;

        if restarted {
            self.start_game();
        }

        Ok(RematchVote {
            requester,
            agreed,
            total,
            restarted,
        })
    }
}

// -----------------------------------------------------------------------------
// ----- RoomState: Private ----------------------------------------------------

impl RoomState {
    fn start_game(&mut self) {
        match self.board.as_mut() {
            Some(board) => board.reset(),
            None => self.board = Some(Board::new()),
        }
        self.rematch_votes.clear();
    }

    fn require_color(&self, conn: ConnectionId) -> Result<Color, SessionError> {
        self.color_of(conn)
            .ok_or_else(|| SessionError::UnknownConnection {
                conn,
                code: self.code.clone(),
            })
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

use bytes::Bytes;
use serde::Serialize;

use crate::shared_types::{Color, Outcome};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

pub const ROOM_REOPENED_MESSAGE: &str =
    "Player disconnected. Room is now available for another player.";

// -----------------------------------------------------------------------------
// ----- ServerEvent -----------------------------------------------------------

/// Every event the server can push to a client, tagged by `"type"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    SelfColor {
        color: Color,
    },
    GameStart,
    Action {
        index: usize,
        color: Color,
    },
    GameStop {
        result: Outcome,
    },
    RematchUpdate {
        requester: Color,
        agreed: usize,
        total: usize,
    },
    GroupMessage {
        message: String,
    },
    Error {
        message: String,
    },
}

// -----------------------------------------------------------------------------
// ----- ServerEvent: Static ---------------------------------------------------

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    pub fn room_reopened() -> Self {
        ServerEvent::GroupMessage {
            message: ROOM_REOPENED_MESSAGE.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- ServerEvent: Public ---------------------------------------------------

impl ServerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::SelfColor { .. } => "self_color",
            ServerEvent::GameStart => "game_start",
            ServerEvent::Action { .. } => "action",
            ServerEvent::GameStop { .. } => "game_stop",
            ServerEvent::RematchUpdate { .. } => "rematch_update",
            ServerEvent::GroupMessage { .. } => "group_message",
            ServerEvent::Error { .. } => "error",
        }
    }

    /// One newline-terminated JSON document.
    pub fn to_line(&self) -> serde_json::Result<Bytes> {
        let mut buf = serde_json::to_vec(self)?;
        buf.push(b'\n');
        Ok(Bytes::from(buf))
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

use serde::Deserialize;

use crate::errors::SessionError;

// -----------------------------------------------------------------------------
// ----- ClientMessage ---------------------------------------------------------

/// Inbound payload. `{"index": 5}` claims a cell, `{"rematch": true}` votes
/// for a new game; one payload may carry both, either, or neither. Unknown
/// keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientMessage {
    #[serde(default)]
    pub index: Option<i64>,

    #[serde(default)]
    pub rematch: Option<bool>,
}

// -----------------------------------------------------------------------------
// ----- ClientMessage: Static -------------------------------------------------

impl ClientMessage {
    pub fn parse(payload: &[u8]) -> Result<Self, SessionError> {
        serde_json::from_slice(payload).map_err(|e| SessionError::malformed(e.to_string()))
    }
}

// -----------------------------------------------------------------------------
// ----- ClientMessage: Public -------------------------------------------------

impl ClientMessage {
    pub fn wants_rematch(&self) -> bool {
        self.rematch.unwrap_or(false)
    }

    pub fn is_noop(&self) -> bool {
        self.index.is_none() && !self.wants_rematch()
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

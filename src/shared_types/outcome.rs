use serde::Serialize;

// -----------------------------------------------------------------------------
// ----- Outcome ---------------------------------------------------------------

/// Result of a finished game, as sent in `game_stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Red,
    Blue,
    Tie,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Outcome::Red => "red",
            Outcome::Blue => "blue",
            Outcome::Tie => "tie",
        };
        f.write_str(s)
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

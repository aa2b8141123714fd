use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// ----- Color -----------------------------------------------------------------

/// The two sides of a room. A room never holds more players than there are
/// colors, so the second occupant always gets whichever one is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
}

// -----------------------------------------------------------------------------
// ----- Color: Static ---------------------------------------------------------

impl Color {
    /// Assignment order: the first occupant of a room is always `ALL[0]`.
    pub const ALL: [Color; 2] = [Color::Red, Color::Blue];

    /// First color in `ALL` that is not in `taken`.
    pub fn first_available<'a>(taken: impl IntoIterator<Item = &'a Color>) -> Option<Color> {
        let taken: Vec<Color> = taken.into_iter().copied().collect();
        Self::ALL.into_iter().find(|c| !taken.contains(c))
    }
}

// -----------------------------------------------------------------------------
// ----- Color: Public ---------------------------------------------------------

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

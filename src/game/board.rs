use crate::errors::SessionError;
use crate::shared_types::{Color, Outcome};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

pub const BOARD_SIDE: usize = 4;
pub const CELL_COUNT: usize = BOARD_SIDE * BOARD_SIDE;

// -----------------------------------------------------------------------------
// ----- Board -----------------------------------------------------------------

/// A 4x4 grid, indexed row-major `0..16`. Each cell is claimed at most once
/// per game; only [`Board::reset`] empties it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Color>; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [None; CELL_COUNT],
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// ----- Board: Public ---------------------------------------------------------

impl Board {
    /// Claim `index` for `color`. Fails without touching the board when the
    /// index is outside the grid or the cell already has an owner.
    pub fn fill(&mut self, index: i64, color: Color) -> Result<usize, SessionError> {
        let slot = usize::try_from(index)
            .ok()
            .filter(|i| *i < CELL_COUNT)
            .ok_or(SessionError::CellOutOfRange { index })?;

        let cell = &mut self.cells[slot];
        if cell.is_some() {
            return Err(SessionError::AlreadyFilled { index: slot });
        }

        *cell = Some(color);
        Ok(slot)
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.cells.get(index).copied().flatten()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// `(red, blue)` cell counts.
    pub fn tally(&self) -> (usize, usize) {
        self.cells
            .iter()
            .flatten()
            .fold((0, 0), |(red, blue), color| match color {
                Color::Red => (red + 1, blue),
                Color::Blue => (red, blue + 1),
            })
    }

    /// Only defined once every cell is owned.
    pub fn winner(&self) -> Option<Outcome> {
        if !self.is_full() {
            return None;
        }

        let (red, blue) = self.tally();
        let outcome = match red.cmp(&blue) {
            std::cmp::Ordering::Greater => Outcome::Red,
            std::cmp::Ordering::Less => Outcome::Blue,
            std::cmp::Ordering::Equal => Outcome::Tie,
        };

        Some(outcome)
    }

    pub fn reset(&mut self) {
        self.cells = [None; CELL_COUNT];
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(red: usize) -> Board {
        let mut board = Board::new();
        for i in 0..CELL_COUNT {
            let color = if i < red { Color::Red } else { Color::Blue };
            board.fill(i as i64, color).unwrap();
        }
        board
    }

    #[test]
    fn filled_cell_rejects_second_fill_without_change() {
        let mut board = Board::new();
        assert_eq!(board.fill(5, Color::Red), Ok(5));

        let before = board.clone();
        let err = board.fill(5, Color::Blue).unwrap_err();

        assert_eq!(err, SessionError::AlreadyFilled { index: 5 });
        assert_eq!(board, before);
        assert_eq!(board.get(5), Some(Color::Red));
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let mut board = Board::new();
        for index in [-1, 16, 1_000] {
            assert_eq!(
                board.fill(index, Color::Red),
                Err(SessionError::CellOutOfRange { index })
            );
        }
        assert!(board.is_empty());
    }

    #[test]
    fn winner_requires_a_full_board() {
        let mut board = Board::new();
        for i in 0..(CELL_COUNT - 1) {
            board.fill(i as i64, Color::Red).unwrap();
        }
        assert!(!board.is_full());
        assert_eq!(board.winner(), None);

        board.fill(15, Color::Blue).unwrap();
        assert!(board.is_full());
        assert_eq!(board.winner(), Some(Outcome::Red));
    }

    #[test]
    fn nine_to_seven_is_a_red_win() {
        let board = board_with(9);
        assert_eq!(board.tally(), (9, 7));
        assert_eq!(board.winner(), Some(Outcome::Red));
    }

    #[test]
    fn eight_to_eight_is_a_tie() {
        let board = board_with(8);
        assert_eq!(board.tally(), (8, 8));
        assert_eq!(board.winner(), Some(Outcome::Tie));
    }

    #[test]
    fn blue_majority_wins_for_blue() {
        assert_eq!(board_with(3).winner(), Some(Outcome::Blue));
    }

    #[test]
    fn reset_clears_every_cell() {
        let mut board = board_with(10);
        board.reset();
        assert!(board.is_empty());
        assert_eq!(board.tally(), (0, 0));
        assert_eq!(board.fill(0, Color::Blue), Ok(0));
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

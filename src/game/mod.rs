pub mod board;

pub use board::{BOARD_SIDE, Board, CELL_COUNT};

use serde::{Deserialize, Serialize};
use shakmaty::Square;
use thiserror::Error;

/// Halfmove clock value at which the fifty-move rule draws the game.
pub const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Occurrences of the same position that draw the game.
pub const REPETITION_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogicError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),
    #[error("illegal position: {0}")]
    IllegalPosition(String),
    #[error("invalid square: {0:?}")]
    InvalidSquare(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game is already over")]
    GameOver,
    #[error("illegal move: {0}")]
    Illegal(String),
    #[error(transparent)]
    Logic(#[from] LogicError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

/// Parses a square name such as `e4`.
pub fn parse_square(name: &str) -> Result<Square, LogicError> {
    name.trim()
        .to_ascii_lowercase()
        .parse::<Square>()
        .map_err(|_| LogicError::InvalidSquare(name.to_string()))
}

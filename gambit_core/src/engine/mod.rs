use crate::logic::board::PieceKind;
use crate::logic::position::Position;
use serde::{Deserialize, Serialize};
use shakmaty::CastlingMode;
use std::fmt;
use thiserror::Error;

pub mod config;
pub mod eval;
pub mod eval_constants;
pub mod search;
pub mod selector;


/// A legal move as produced by [`Position::legal_moves`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Move(shakmaty::Move);

impl Move {
    #[must_use]
    pub fn promotion(&self) -> Option<PieceKind> {
        self.0.promotion().map(PieceKind::from)
    }

    /// Long algebraic form, castling written as the king's move (`e1g1`).
    #[must_use]
    pub fn to_uci(&self) -> String {
        self.0.to_uci(CastlingMode::Standard).to_string()
    }

    pub(crate) const fn inner(&self) -> &shakmaty::Move {
        &self.0
    }
}

impl From<shakmaty::Move> for Move {
    fn from(mv: shakmaty::Move) -> Self {
        Self(mv)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// A candidate move and the minimax value of the position it leads to.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedMove {
    pub mv: Move,
    pub evaluation: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u64,
    pub time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("no legal moves in this position")]
    NoLegalMoves,
    #[error("search aborted: {0}")]
    Aborted(String),
}

/// Scores a position from White's perspective.
pub trait Evaluator {
    fn evaluate(&self, position: &Position) -> f64;
}

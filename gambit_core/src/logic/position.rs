//! Value-typed chess position backed by `shakmaty`.
//!
//! Every transition returns a fresh [`Position`]; nothing here mutates a
//! snapshot another caller can observe, so search branches never alias.

use crate::engine::Move;
use crate::logic::board::{BoardCoordinate, PieceColor, PieceKind, PlacedPiece};
use crate::logic::rules::{parse_square, DrawReason, LogicError, MoveError, FIFTY_MOVE_HALFMOVES};
use log::warn;
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position as _, Role, Square};

#[derive(Debug, Clone, Default)]
pub struct Position {
    chess: Chess,
}

impl Position {
    #[must_use]
    pub fn start() -> Self {
        Self::default()
    }

    pub fn from_fen(fen: &str) -> Result<Self, LogicError> {
        let parsed = Fen::from_ascii(fen.trim().as_bytes())
            .map_err(|e| LogicError::InvalidFen(e.to_string()))?;
        let chess: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| LogicError::IllegalPosition(e.to_string()))?;
        Ok(Self { chess })
    }

    /// Parses `fen`, falling back to the standard start position when it is
    /// unusable. The parse error is handed back so callers can surface it.
    #[must_use]
    pub fn from_fen_or_start(fen: &str) -> (Self, Option<LogicError>) {
        match Self::from_fen(fen) {
            Ok(position) => (position, None),
            Err(err) => {
                warn!("Falling back to the start position: {err}");
                (Self::start(), Some(err))
            }
        }
    }

    #[must_use]
    pub fn to_fen(&self) -> String {
        Fen::from_position(self.chess.clone(), EnPassantMode::Legal).to_string()
    }

    /// Placement, side to move, castling rights and en passant square.
    /// Two positions with equal keys are the same for repetition purposes.
    #[must_use]
    pub fn repetition_key(&self) -> String {
        self.to_fen()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[must_use]
    pub fn side_to_move(&self) -> PieceColor {
        self.chess.turn().into()
    }

    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.chess.fullmoves().get()
    }

    /// Legal moves in generator order. Promotions are offered as queen
    /// promotions only.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Move> {
        self.chess
            .legal_moves()
            .into_iter()
            .filter(|m| m.promotion().map_or(true, |role| role == Role::Queen))
            .map(Move::from)
            .collect()
    }

    /// Number of legal moves for the side to move, under-promotions included.
    #[must_use]
    pub fn legal_move_count(&self) -> usize {
        self.chess.legal_moves().len()
    }

    #[must_use]
    pub fn is_legal(&self, mv: &Move) -> bool {
        self.chess.is_legal(mv.inner())
    }

    /// Returns the position after `mv`. `mv` must come from [`Self::legal_moves`].
    #[must_use]
    pub fn apply_move(&self, mv: &Move) -> Self {
        let mut chess = self.chess.clone();
        chess.play_unchecked(mv.inner());
        Self { chess }
    }

    /// Like [`Self::apply_move`], also rendering the move in SAN.
    #[must_use]
    pub fn apply_move_with_san(&self, mv: &Move) -> (Self, String) {
        let mut chess = self.chess.clone();
        let san = SanPlus::from_move_and_play_unchecked(&mut chess, mv.inner());
        (Self { chess }, san.to_string())
    }

    /// Resolves an origin/destination pair to a legal move. Pawns reaching
    /// the last rank promote to a queen; castling is given as the king's
    /// two-square move.
    pub fn find_move(&self, from: &str, to: &str) -> Result<Move, MoveError> {
        let from_sq = parse_square(from)?;
        let to_sq = parse_square(to)?;
        self.find_move_between(from_sq, to_sq)
            .ok_or_else(|| MoveError::Illegal(format!("{from_sq}{to_sq}")))
    }

    fn find_move_between(&self, from: Square, to: Square) -> Option<Move> {
        self.legal_moves().into_iter().find(|mv| {
            matches!(
                mv.inner().to_uci(CastlingMode::Standard),
                UciMove::Normal { from: f, to: t, .. } if f == from && t == to
            )
        })
    }

    #[must_use]
    pub fn is_check(&self) -> bool {
        self.chess.is_check()
    }

    #[must_use]
    pub fn is_checkmate(&self) -> bool {
        self.chess.is_checkmate()
    }

    #[must_use]
    pub fn is_insufficient_material(&self) -> bool {
        self.chess.is_insufficient_material()
    }

    #[must_use]
    pub fn fifty_move_rule_reached(&self) -> bool {
        self.chess.halfmoves() >= FIFTY_MOVE_HALFMOVES
    }

    /// Draws visible from this snapshot alone. Repetition needs the game
    /// history and is reported by `GameState`.
    #[must_use]
    pub fn draw_reason(&self) -> Option<DrawReason> {
        if self.chess.is_stalemate() {
            Some(DrawReason::Stalemate)
        } else if self.is_insufficient_material() {
            Some(DrawReason::InsufficientMaterial)
        } else if self.fifty_move_rule_reached() && !self.is_checkmate() {
            Some(DrawReason::FiftyMoveRule)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.draw_reason().is_some()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// Occupied squares, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = PlacedPiece> + '_ {
        let board = self.chess.board();
        Square::ALL.into_iter().filter_map(move |square| {
            board.piece_at(square).map(|piece| PlacedPiece {
                at: BoardCoordinate::from_square(square),
                color: piece.color.into(),
                kind: piece.role.into(),
            })
        })
    }
}

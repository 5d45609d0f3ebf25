use crate::engine::config::EngineConfig;
use crate::engine::eval_constants::{
    PST_BISHOP, PST_KING, PST_KNIGHT, PST_PAWN, PST_QUEEN, PST_ROOK,
};
use crate::engine::Evaluator;
use crate::logic::board::{PieceColor, PieceKind, PlacedPiece};
use crate::logic::position::Position;
use std::sync::Arc;

/// Material, piece-square bonuses and mobility, scored from White's side.
pub struct PositionEvaluator {
    config: Arc<EngineConfig>,
}

impl PositionEvaluator {
    pub const fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &Arc<EngineConfig> {
        &self.config
    }

    fn material(&self, kind: PieceKind) -> f64 {
        match kind {
            PieceKind::Pawn => self.config.val_pawn,
            PieceKind::Knight => self.config.val_knight,
            PieceKind::Bishop => self.config.val_bishop,
            PieceKind::Rook => self.config.val_rook,
            PieceKind::Queen => self.config.val_queen,
            PieceKind::King => self.config.val_king,
        }
    }

    fn piece_score(&self, piece: PlacedPiece) -> f64 {
        let at = match piece.color {
            PieceColor::White => piece.at,
            PieceColor::Black => piece.at.mirrored(),
        };
        let table = match piece.kind {
            PieceKind::Pawn => &PST_PAWN,
            PieceKind::Knight => &PST_KNIGHT,
            PieceKind::Bishop => &PST_BISHOP,
            PieceKind::Rook => &PST_ROOK,
            PieceKind::Queen => &PST_QUEEN,
            PieceKind::King => &PST_KING,
        };
        let bonus = table
            .get(at.row)
            .and_then(|row| row.get(at.col))
            .copied()
            .unwrap_or(0.0);

        piece.color.sign() * (self.material(piece.kind) + bonus)
    }
}

impl Default for PositionEvaluator {
    fn default() -> Self {
        Self::new(Arc::new(EngineConfig::default()))
    }
}

impl Evaluator for PositionEvaluator {
    fn evaluate(&self, position: &Position) -> f64 {
        // 1. Terminal positions
        if position.is_checkmate() {
            // The side to move has been mated.
            return -position.side_to_move().sign() * self.config.mate_score;
        }
        if position.is_draw() {
            return 0.0;
        }

        // 2. Material & PST
        let mut score: f64 = position.pieces().map(|p| self.piece_score(p)).sum();

        // 3. Mobility
        #[allow(clippy::cast_precision_loss)]
        let mobility = position.legal_move_count() as f64;
        score += self.config.mobility_weight * mobility * position.side_to_move().sign();

        score
    }
}

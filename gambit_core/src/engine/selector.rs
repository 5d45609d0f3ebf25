//! Turns search values into a concrete move for a difficulty profile.
//!
//! Every candidate is scored by a fresh minimax search one ply shallower
//! than the profile depth. The ranked list is then cut to the top `k`
//! entries and one of them is drawn uniformly; `k` grows with the
//! profile's random factor, so weaker levels blunder more often.

use crate::engine::config::{DifficultyProfile, EngineConfig};
use crate::engine::eval::PositionEvaluator;
use crate::engine::search::AlphaBetaEngine;
use crate::engine::{EngineError, EvaluatedMove, Evaluator, SearchStats};
use crate::logic::board::PieceColor;
use crate::logic::position::Position;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;

/// Size of the pool the selector draws from: `max(1, floor(n * random_factor))`,
/// never more than `n`. A non-positive factor always yields 1.
#[must_use]
pub fn top_k(move_count: usize, random_factor: f64) -> usize {
    if random_factor <= 0.0 || move_count == 0 {
        return 1;
    }
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let k = (move_count as f64 * random_factor).floor() as usize;
    k.clamp(1, move_count)
}

pub struct MoveSelector<R: Rng = StdRng, E: Evaluator = PositionEvaluator> {
    engine: AlphaBetaEngine<E>,
    rng: R,
}

impl MoveSelector<StdRng, PositionEvaluator> {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self::with_parts(AlphaBetaEngine::new(config), StdRng::from_entropy())
    }

    pub fn seeded(config: Arc<EngineConfig>, seed: u64) -> Self {
        Self::with_parts(AlphaBetaEngine::new(config), StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng, E: Evaluator> MoveSelector<R, E> {
    pub const fn with_parts(engine: AlphaBetaEngine<E>, rng: R) -> Self {
        Self { engine, rng }
    }

    pub fn engine_mut(&mut self) -> &mut AlphaBetaEngine<E> {
        &mut self.engine
    }

    /// Every legal move with its searched value, best first for the side to
    /// move. Ties keep the rules engine's order.
    pub fn evaluate_moves(&mut self, position: &Position, depth: u8) -> Vec<EvaluatedMove> {
        let child_depth = depth.saturating_sub(1);
        let mut scored: Vec<EvaluatedMove> = position
            .legal_moves()
            .into_iter()
            .map(|mv| {
                let child = position.apply_move(&mv);
                let maximizing = child.side_to_move() == PieceColor::White;
                let evaluation = self.engine.minimax(
                    &child,
                    child_depth,
                    f64::NEG_INFINITY,
                    f64::INFINITY,
                    maximizing,
                );
                EvaluatedMove { mv, evaluation }
            })
            .collect();

        match position.side_to_move() {
            PieceColor::White => scored.sort_by(|a, b| b.evaluation.total_cmp(&a.evaluation)),
            PieceColor::Black => scored.sort_by(|a, b| a.evaluation.total_cmp(&b.evaluation)),
        }
        scored
    }

    pub fn select_move(
        &mut self,
        position: &Position,
        profile: DifficultyProfile,
    ) -> Result<(EvaluatedMove, SearchStats), EngineError> {
        let started = Instant::now();
        self.engine.reset_nodes();

        let mut ranked = self.evaluate_moves(position, profile.depth);
        if ranked.is_empty() {
            return Err(EngineError::NoLegalMoves);
        }

        let k = top_k(ranked.len(), profile.random_factor);
        let index = if k > 1 { self.rng.gen_range(0..k) } else { 0 };
        debug!(
            "Selector: {} candidates, picking {} of top {}",
            ranked.len(),
            index,
            k
        );
        let chosen = ranked.swap_remove(index);

        let stats = SearchStats {
            depth: profile.depth,
            nodes: self.engine.nodes_searched(),
            #[allow(clippy::cast_possible_truncation)]
            time_ms: started.elapsed().as_millis() as u64,
        };
        Ok((chosen, stats))
    }
}

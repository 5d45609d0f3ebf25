use crate::engine::config::EngineConfig;
use crate::engine::eval::PositionEvaluator;
use crate::engine::Evaluator;
use crate::logic::position::Position;
use std::sync::Arc;

/// Fixed-depth minimax with alpha-beta pruning.
///
/// Moves are searched in the order the rules engine produces them, so two
/// searches of the same position visit the same nodes. Every child is a
/// fresh [`Position`]; siblings never share state.
pub struct AlphaBetaEngine<E: Evaluator = PositionEvaluator> {
    evaluator: E,
    nodes_searched: u64,
}

impl AlphaBetaEngine<PositionEvaluator> {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self::with_evaluator(PositionEvaluator::new(config))
    }

    pub fn update_config(&mut self, config: Arc<EngineConfig>) {
        self.evaluator = PositionEvaluator::new(config);
    }
}

impl<E: Evaluator> AlphaBetaEngine<E> {
    pub const fn with_evaluator(evaluator: E) -> Self {
        Self {
            evaluator,
            nodes_searched: 0,
        }
    }

    pub const fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Nodes visited since the last [`Self::reset_nodes`].
    pub const fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    pub fn reset_nodes(&mut self) {
        self.nodes_searched = 0;
    }

    /// Value of `position` searched `depth` plies deep, from White's side.
    /// `maximizing` is true when White is to move in `position`.
    pub fn minimax(
        &mut self,
        position: &Position,
        depth: u8,
        mut alpha: f64,
        mut beta: f64,
        maximizing: bool,
    ) -> f64 {
        self.nodes_searched += 1;

        if depth == 0 || position.is_game_over() {
            return self.evaluator.evaluate(position);
        }

        let moves = position.legal_moves();
        if moves.is_empty() {
            return self.evaluator.evaluate(position);
        }

        if maximizing {
            let mut max_eval = f64::NEG_INFINITY;
            for mv in &moves {
                let child = position.apply_move(mv);
                let eval = self.minimax(&child, depth - 1, alpha, beta, false);
                max_eval = max_eval.max(eval);
                alpha = alpha.max(eval);
                if beta <= alpha {
                    break;
                }
            }
            max_eval
        } else {
            let mut min_eval = f64::INFINITY;
            for mv in &moves {
                let child = position.apply_move(mv);
                let eval = self.minimax(&child, depth - 1, alpha, beta, true);
                min_eval = min_eval.min(eval);
                beta = beta.min(eval);
                if beta <= alpha {
                    break;
                }
            }
            min_eval
        }
    }
}

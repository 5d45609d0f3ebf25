use crate::engine::config::{Difficulty, EngineConfig};
use crate::engine::search::AlphaBetaEngine;
use crate::engine::selector::MoveSelector;
use crate::engine::{EngineError, Move, SearchStats};
use crate::logic::position::Position;
use crate::session::AiJob;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

pub enum Input {
    ComputeMove {
        position: Position,
        difficulty: Difficulty,
    },
    /// Swaps the evaluation weights used by later searches.
    UpdateConfig(Arc<EngineConfig>),
}

pub enum Output {
    MoveFound {
        mv: Move,
        evaluation: f64,
        stats: SearchStats,
    },
    ConfigUpdated,
}

/// Runs move selection off the session's thread. One worker can serve any
/// number of requests; it keeps its selector and RNG between them.
pub struct GameWorker<R: Rng = StdRng> {
    selector: MoveSelector<R>,
}

impl GameWorker<StdRng> {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            selector: MoveSelector::new(config),
        }
    }

    pub fn seeded(config: Arc<EngineConfig>, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameWorker<R> {
    pub fn with_rng(config: Arc<EngineConfig>, rng: R) -> Self {
        Self {
            selector: MoveSelector::with_parts(AlphaBetaEngine::new(config), rng),
        }
    }

    pub fn received(&mut self, msg: Input) -> Result<Output, EngineError> {
        match msg {
            Input::ComputeMove {
                position,
                difficulty,
            } => {
                let (mv, evaluation, stats) = self.compute(&position, difficulty)?;
                Ok(Output::MoveFound {
                    mv,
                    evaluation,
                    stats,
                })
            }
            Input::UpdateConfig(config) => {
                self.selector.engine_mut().update_config(config);
                debug!("AI evaluation weights replaced");
                Ok(Output::ConfigUpdated)
            }
        }
    }

    /// Answers a session's job with the move to play.
    pub fn run(&mut self, job: &AiJob) -> Result<Move, EngineError> {
        self.compute(&job.position, job.difficulty)
            .map(|(mv, _, _)| mv)
    }

    fn compute(
        &mut self,
        position: &Position,
        difficulty: Difficulty,
    ) -> Result<(Move, f64, SearchStats), EngineError> {
        let (chosen, stats) = self.selector.select_move(position, difficulty.profile())?;
        debug!(
            "AI {difficulty}: {} eval {:.2} depth {} nodes {} in {}ms",
            chosen.mv, chosen.evaluation, stats.depth, stats.nodes, stats.time_ms
        );
        Ok((chosen.mv, chosen.evaluation, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Evaluator;
    use crate::logic::board::PieceColor;
    use crate::session::record::MemorySink;
    use crate::session::{GameSession, SessionConfig, SessionStatus};

    #[test]
    fn test_compute_move_reports_stats() {
        let mut worker = GameWorker::seeded(Arc::new(EngineConfig::instant()), 1);
        let Ok(Output::MoveFound { mv, stats, .. }) = worker.received(Input::ComputeMove {
            position: Position::start(),
            difficulty: Difficulty::Medium,
        }) else {
            panic!("Expected MoveFound");
        };
        assert!(Position::start().is_legal(&mv));
        assert_eq!(stats.depth, 2);
        assert!(stats.nodes >= 20);
    }

    #[test]
    fn test_update_config_changes_later_searches() {
        let mut worker = GameWorker::seeded(Arc::new(EngineConfig::instant()), 3);
        let extra_rook = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let before = worker.selector.engine_mut().evaluator().evaluate(&extra_rook);

        let heavier = EngineConfig::load_from_json(r#"{"val_rook": 2.0}"#).unwrap();
        assert!(matches!(
            worker.received(Input::UpdateConfig(Arc::new(heavier))),
            Ok(Output::ConfigUpdated)
        ));

        let evaluator = worker.selector.engine_mut().evaluator();
        assert_eq!(evaluator.config().val_rook, 10.0);
        assert!((evaluator.evaluate(&extra_rook) - before - 5.0).abs() < 1e-9);

        let Ok(Output::MoveFound { mv, .. }) = worker.received(Input::ComputeMove {
            position: extra_rook.clone(),
            difficulty: Difficulty::Easy,
        }) else {
            panic!("Expected MoveFound");
        };
        assert!(extra_rook.is_legal(&mv));
    }

    #[test]
    fn test_no_legal_moves() {
        let mut worker = GameWorker::seeded(Arc::new(EngineConfig::instant()), 1);
        let mated =
            Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        let result = worker.received(Input::ComputeMove {
            position: mated,
            difficulty: Difficulty::Easy,
        });
        assert!(matches!(result, Err(EngineError::NoLegalMoves)));
    }

    #[test]
    fn test_run_answers_session_job() {
        let config = Arc::new(EngineConfig::instant());
        let mut session = GameSession::new(
            SessionConfig::new(
                PieceColor::Black,
                Difficulty::Easy,
                crate::engine::config::TimeControl::default(),
            ),
            Arc::new(MemorySink::new()),
            config.clone(),
        );
        let job = session.start().unwrap().ai_job.unwrap();

        let mut worker = GameWorker::seeded(config, 2);
        let mv = worker.run(&job);
        assert!(mv.is_ok());
        session.apply_ai_result(job.ticket, mv).unwrap();
        assert_eq!(session.status(), SessionStatus::Active);
    }
}

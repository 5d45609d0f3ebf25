//! Human-versus-computer game session.
//!
//! [`GameSession`] is a synchronous state machine. It never sleeps, spawns
//! or searches; instead it hands out [`AiJob`]s and expects the host to call
//! [`GameSession::tick`] once per second and to feed finished searches back
//! through [`GameSession::apply_ai_result`]. Each job carries an
//! [`AiTicket`], so a result that arrives after the game moved on is
//! rejected instead of corrupting the board.
//!
//! ```text
//! setup -> active <-> ai_thinking -> over
//! ```

pub mod clock;
pub mod record;

use crate::engine::config::{Difficulty, EngineConfig, TimeControl};
use crate::engine::{EngineError, Move};
use crate::logic::board::PieceColor;
use crate::logic::game::{GameState, GameStatus};
use crate::logic::position::Position;
use crate::logic::rules::{DrawReason, LogicError, MoveError};
use clock::GameClock;
use log::{info, warn};
use rand::Rng;
use record::{save_or_log, GameRecord, GameRecordSink};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Setup,
    Active,
    AiThinking,
    Over,
}

/// Result from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Victory,
    Defeat,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Checkmate,
    Timeout,
    Resignation,
    DrawAgreed,
    Abandonment,
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
    Forfeit,
}

impl From<DrawReason> for Outcome {
    fn from(reason: DrawReason) -> Self {
        match reason {
            DrawReason::Stalemate => Self::Stalemate,
            DrawReason::InsufficientMaterial => Self::InsufficientMaterial,
            DrawReason::FiftyMoveRule => Self::FiftyMoveRule,
            DrawReason::ThreefoldRepetition => Self::ThreefoldRepetition,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("the session has not started")]
    NotStarted,
    #[error("the session has already started")]
    AlreadyStarted,
    #[error("the game is over")]
    GameOver,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("the computer is thinking")]
    AiThinking,
    #[error("stale computer move discarded")]
    StaleAiResult,
    #[error(transparent)]
    Move(#[from] MoveError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub user_color: PieceColor,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub time_control: TimeControl,
    /// Optional starting position. Unusable FEN falls back to the standard start.
    #[serde(default)]
    pub start_fen: Option<String>,
}

impl SessionConfig {
    #[must_use]
    pub fn new(user_color: PieceColor, difficulty: Difficulty, time_control: TimeControl) -> Self {
        Self {
            user_color,
            difficulty,
            time_control,
            start_fen: None,
        }
    }

    #[must_use]
    pub fn with_fen(mut self, fen: impl Into<String>) -> Self {
        self.start_fen = Some(fen.into());
        self
    }
}

/// Identifies one AI computation of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AiTicket {
    pub session: u64,
    pub job: u64,
}

/// Work order for the host: wait `delay`, search `position`, report back.
#[derive(Debug, Clone)]
pub struct AiJob {
    pub ticket: AiTicket,
    pub position: Position,
    pub difficulty: Difficulty,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct SessionStart {
    pub ai_job: Option<AiJob>,
    pub fen_error: Option<LogicError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to time: the session is not running.
    Idle,
    Running(GameClock),
    /// `loser`'s clock reached zero and the session is over.
    TimedOut { loser: PieceColor },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveView {
    pub uci: String,
    pub san: String,
    pub color: PieceColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub fen: String,
    pub side_to_move: PieceColor,
    pub user_color: PieceColor,
    pub difficulty: Difficulty,
    pub time_control_minutes: u8,
    pub clock: GameClock,
    pub in_check: bool,
    pub moves: Vec<MoveView>,
    pub last_move: Option<MoveView>,
    pub moves_text: String,
    pub result: Option<GameResult>,
    pub outcome: Option<Outcome>,
}

pub struct GameSession {
    id: u64,
    config: SessionConfig,
    engine_config: Arc<EngineConfig>,
    sink: Arc<dyn GameRecordSink>,
    game: GameState,
    clock: GameClock,
    status: SessionStatus,
    result: Option<(GameResult, Outcome)>,
    pending: Option<AiTicket>,
    jobs_issued: u64,
    ai_failures: u32,
}

impl GameSession {
    pub fn new(
        config: SessionConfig,
        sink: Arc<dyn GameRecordSink>,
        engine_config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            clock: GameClock::new(config.time_control),
            config,
            engine_config,
            sink,
            game: GameState::new(),
            status: SessionStatus::Setup,
            result: None,
            pending: None,
            jobs_issued: 0,
            ai_failures: 0,
        }
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn game(&self) -> &GameState {
        &self.game
    }

    #[must_use]
    pub const fn clock(&self) -> GameClock {
        self.clock
    }

    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        self.result.map(|(result, _)| result)
    }

    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.result.map(|(_, outcome)| outcome)
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.status == SessionStatus::Over
    }

    fn is_running(&self) -> bool {
        matches!(self.status, SessionStatus::Active | SessionStatus::AiThinking)
    }

    pub fn start(&mut self) -> Result<SessionStart, SessionError> {
        if self.status != SessionStatus::Setup {
            return Err(SessionError::AlreadyStarted);
        }

        let (position, fen_error) = match &self.config.start_fen {
            Some(fen) => Position::from_fen_or_start(fen),
            None => (Position::start(), None),
        };
        self.game = GameState::from_position(position);
        self.clock = GameClock::new(self.config.time_control);
        self.status = SessionStatus::Active;

        info!(
            "Session {} started: user plays {}, {} difficulty, {} min",
            self.id,
            self.config.user_color,
            self.config.difficulty,
            self.config.time_control.minutes()
        );

        let ai_job = self.after_move();
        Ok(SessionStart { ai_job, fen_error })
    }

    /// Plays the user's move given as square names (`e2`, `e4`).
    pub fn apply_user_move(&mut self, from: &str, to: &str) -> Result<Option<AiJob>, SessionError> {
        match self.status {
            SessionStatus::Setup => return Err(SessionError::NotStarted),
            SessionStatus::Over => return Err(SessionError::GameOver),
            SessionStatus::AiThinking => return Err(SessionError::AiThinking),
            SessionStatus::Active => {}
        }
        if self.game.turn() != self.config.user_color {
            return Err(SessionError::NotYourTurn);
        }

        self.game.make_move_between(from, to)?;
        Ok(self.after_move())
    }

    /// One elapsed second on the clock of the side to move.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Idle;
        }

        let mover = self.game.turn();
        if self.clock.tick(mover) {
            let result = if mover == self.config.user_color {
                GameResult::Defeat
            } else {
                GameResult::Victory
            };
            self.finish(result, Outcome::Timeout);
            TickOutcome::TimedOut { loser: mover }
        } else {
            TickOutcome::Running(self.clock)
        }
    }

    /// Feeds back the result of the job identified by `ticket`. Failed
    /// searches are retried up to `ai_retry_limit` times, after which the
    /// computer forfeits.
    pub fn apply_ai_result(
        &mut self,
        ticket: AiTicket,
        result: Result<Move, EngineError>,
    ) -> Result<Option<AiJob>, SessionError> {
        if self.status != SessionStatus::AiThinking || self.pending != Some(ticket) {
            warn!(
                "Session {}: discarding stale computer result for job {}",
                self.id, ticket.job
            );
            return Err(SessionError::StaleAiResult);
        }
        self.pending = None;

        let failure = match result {
            Ok(mv) => match self.game.make_move(&mv) {
                Ok(_) => None,
                Err(err) => Some(err.to_string()),
            },
            Err(err) => Some(err.to_string()),
        };

        match failure {
            None => {
                self.ai_failures = 0;
                Ok(self.after_move())
            }
            Some(reason) => {
                self.ai_failures += 1;
                warn!(
                    "Session {}: computer move failed ({reason}), attempt {}",
                    self.id, self.ai_failures
                );
                if self.ai_failures > self.engine_config.ai_retry_limit {
                    self.finish(GameResult::Victory, Outcome::Forfeit);
                    Ok(None)
                } else {
                    Ok(Some(self.issue_ai_job()))
                }
            }
        }
    }

    pub fn resign(&mut self) -> Result<(), SessionError> {
        self.ensure_running()?;
        self.finish(GameResult::Defeat, Outcome::Resignation);
        Ok(())
    }

    /// The computer accepts with `draw_accept_probability`. Returns whether
    /// the offer was accepted.
    pub fn offer_draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<bool, SessionError> {
        self.ensure_running()?;
        let accepted = rng.gen::<f64>() < self.engine_config.draw_accept_probability;
        if accepted {
            self.finish(GameResult::Draw, Outcome::DrawAgreed);
        } else {
            info!("Session {}: draw offer declined", self.id);
        }
        Ok(accepted)
    }

    /// Ends an unfinished game as a loss for the user. Returns false when
    /// there was nothing to abandon.
    pub fn abandon(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.finish(GameResult::Defeat, Outcome::Abandonment);
        true
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let view = |record: &crate::logic::game::MoveRecord| MoveView {
            uci: record.mv.to_uci(),
            san: record.san.clone(),
            color: record.color,
        };
        let position = self.game.position();

        SessionSnapshot {
            status: self.status,
            fen: position.to_fen(),
            side_to_move: position.side_to_move(),
            user_color: self.config.user_color,
            difficulty: self.config.difficulty,
            time_control_minutes: self.config.time_control.minutes(),
            clock: self.clock,
            in_check: position.is_check(),
            moves: self.game.history().iter().map(view).collect(),
            last_move: self.game.last_move().map(view),
            moves_text: self.game.moves_text(),
            result: self.result(),
            outcome: self.outcome(),
        }
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Setup => Err(SessionError::NotStarted),
            SessionStatus::Over => Err(SessionError::GameOver),
            SessionStatus::Active | SessionStatus::AiThinking => Ok(()),
        }
    }

    /// Settles the position after any move: ends the game or hands the turn
    /// to whoever is next.
    fn after_move(&mut self) -> Option<AiJob> {
        match self.game.status() {
            GameStatus::Checkmate { winner } => {
                let result = if winner == self.config.user_color {
                    GameResult::Victory
                } else {
                    GameResult::Defeat
                };
                self.finish(result, Outcome::Checkmate);
                None
            }
            GameStatus::Draw { reason } => {
                self.finish(GameResult::Draw, reason.into());
                None
            }
            GameStatus::Playing if self.game.turn() == self.config.user_color => {
                self.status = SessionStatus::Active;
                None
            }
            GameStatus::Playing => Some(self.issue_ai_job()),
        }
    }

    fn issue_ai_job(&mut self) -> AiJob {
        self.jobs_issued += 1;
        let ticket = AiTicket {
            session: self.id,
            job: self.jobs_issued,
        };
        self.pending = Some(ticket);
        self.status = SessionStatus::AiThinking;

        let depth = self.config.difficulty.profile().depth;
        AiJob {
            ticket,
            position: self.game.position().clone(),
            difficulty: self.config.difficulty,
            delay: self.engine_config.ai_delay(depth),
        }
    }

    fn finish(&mut self, result: GameResult, outcome: Outcome) {
        self.status = SessionStatus::Over;
        self.pending = None;
        self.result = Some((result, outcome));

        info!(
            "Session {} over: {:?} by {:?} after {} moves",
            self.id,
            result,
            outcome,
            self.game.history().len()
        );

        let record = GameRecord {
            color: self.config.user_color,
            difficulty: self.config.difficulty,
            time_control_minutes: self.config.time_control.minutes(),
            result,
            outcome,
            moves_text: self.game.moves_text(),
            finished_at_ms: GameRecord::now_ms(),
        };
        save_or_log(self.sink.as_ref(), &record);
    }
}

#[cfg(test)]
mod tests;

use crate::engine::Move;
use crate::logic::board::PieceColor;
use crate::logic::position::Position;
use crate::logic::rules::{DrawReason, MoveError, REPETITION_LIMIT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GameStatus {
    Playing,
    Checkmate { winner: PieceColor },
    Draw { reason: DrawReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    pub san: String,
    pub color: PieceColor,
}

#[derive(Debug, Clone)]
pub struct GameState {
    position: Position,
    status: GameStatus,
    history: Vec<MoveRecord>,
    start_fullmove: u32,
    start_turn: PieceColor,
    repetitions: HashMap<String, usize>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self::from_position(Position::start())
    }

    /// Starts a game record at an arbitrary position. Its status is computed
    /// immediately, so a position that is already mate or drawn is over.
    #[must_use]
    pub fn from_position(position: Position) -> Self {
        let mut game = Self {
            start_fullmove: position.fullmove_number(),
            start_turn: position.side_to_move(),
            position,
            status: GameStatus::Playing,
            history: Vec::new(),
            repetitions: HashMap::new(),
        };
        game.repetitions.insert(game.position.repetition_key(), 1);
        game.update_status(1);
        game
    }

    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub fn turn(&self) -> PieceColor {
        self.position.side_to_move()
    }

    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.status != GameStatus::Playing
    }

    #[must_use]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    #[must_use]
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    /// Plays `mv` for the side to move. On error nothing changes.
    pub fn make_move(&mut self, mv: &Move) -> Result<&MoveRecord, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if !self.position.is_legal(mv) {
            return Err(MoveError::Illegal(mv.to_uci()));
        }

        let color = self.position.side_to_move();
        let (next, san) = self.position.apply_move_with_san(mv);
        self.position = next;

        let seen = self
            .repetitions
            .entry(self.position.repetition_key())
            .or_insert(0);
        *seen += 1;
        let occurrences = *seen;

        self.history.push(MoveRecord {
            mv: mv.clone(),
            san,
            color,
        });
        self.update_status(occurrences);

        self.history.last().ok_or(MoveError::GameOver)
    }

    /// Resolves and plays a move given by origin and destination squares.
    pub fn make_move_between(&mut self, from: &str, to: &str) -> Result<&MoveRecord, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        let mv = self.position.find_move(from, to)?;
        self.make_move(&mv)
    }

    fn update_status(&mut self, occurrences: usize) {
        self.status = if self.position.is_checkmate() {
            GameStatus::Checkmate {
                winner: self.position.side_to_move().opposite(),
            }
        } else if let Some(reason) = self.position.draw_reason() {
            GameStatus::Draw { reason }
        } else if occurrences >= REPETITION_LIMIT {
            GameStatus::Draw {
                reason: DrawReason::ThreefoldRepetition,
            }
        } else {
            GameStatus::Playing
        };
    }

    /// The move log as numbered move text: `1. e4 e5 2. Nf3`.
    #[must_use]
    pub fn moves_text(&self) -> String {
        let mut text = String::new();
        let mut number = self.start_fullmove;

        for (i, record) in self.history.iter().enumerate() {
            if !text.is_empty() {
                text.push(' ');
            }
            match record.color {
                PieceColor::White => {
                    let _ = write!(text, "{number}. {}", record.san);
                }
                PieceColor::Black => {
                    if i == 0 && self.start_turn == PieceColor::Black {
                        let _ = write!(text, "{number}... {}", record.san);
                    } else {
                        text.push_str(&record.san);
                    }
                    number += 1;
                }
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(game: &mut GameState, moves: &[(&str, &str)]) {
        for (from, to) in moves {
            game.make_move_between(from, to).unwrap();
        }
    }

    #[test]
    fn test_moves_text_numbering() {
        let mut game = GameState::new();
        play(&mut game, &[("e2", "e4"), ("e7", "e5"), ("g1", "f3")]);

        assert_eq!(game.moves_text(), "1. e4 e5 2. Nf3");
        assert_eq!(game.turn(), PieceColor::Black);
        assert_eq!(game.history().len(), 3);
        assert_eq!(game.last_move().unwrap().san, "Nf3");
    }

    #[test]
    fn test_moves_text_black_first() {
        let position = Position::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
        )
        .unwrap();
        let mut game = GameState::from_position(position);
        play(&mut game, &[("c7", "c5"), ("g1", "f3")]);
        assert_eq!(game.moves_text(), "1... c5 2. Nf3");
    }

    #[test]
    fn test_illegal_move_leaves_state() {
        let mut game = GameState::new();
        let before = game.position().to_fen();

        let err = game.make_move_between("e2", "e5").unwrap_err();
        assert_eq!(err, MoveError::Illegal("e2e5".to_string()));
        assert!(game.make_move_between("z9", "e4").is_err());

        assert_eq!(game.position().to_fen(), before);
        assert!(game.history().is_empty());
        assert_eq!(game.status(), GameStatus::Playing);
    }

    #[test]
    fn test_checkmate_status_and_game_over() {
        let mut game = GameState::new();
        play(
            &mut game,
            &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")],
        );

        assert_eq!(
            game.status(),
            GameStatus::Checkmate {
                winner: PieceColor::Black
            }
        );
        assert_eq!(game.moves_text(), "1. f3 e5 2. g4 Qh4#");
        assert_eq!(
            game.make_move_between("a2", "a3").unwrap_err(),
            MoveError::GameOver
        );
    }

    #[test]
    fn test_stalemate_is_draw() {
        let position = Position::from_fen("7k/8/4Q3/6K1/8/8/8/8 w - - 0 1").unwrap();
        let mut game = GameState::from_position(position);
        play(&mut game, &[("e6", "f7")]);
        assert_eq!(
            game.status(),
            GameStatus::Draw {
                reason: DrawReason::Stalemate
            }
        );
    }

    #[test]
    fn test_already_finished_position() {
        let position = Position::from_fen("8/8/4k3/8/8/4K3/8/8 w - - 0 1").unwrap();
        let game = GameState::from_position(position);
        assert!(game.is_over());
        assert_eq!(
            game.status(),
            GameStatus::Draw {
                reason: DrawReason::InsufficientMaterial
            }
        );
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&GameStatus::Draw {
            reason: DrawReason::FiftyMoveRule,
        })
        .unwrap();
        assert_eq!(json, r#"{"state":"draw","reason":"fifty-move-rule"}"#);
    }
}

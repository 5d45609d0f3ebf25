use gambit_core::{
    engine::config::{Difficulty, TimeControl},
    logic::board::PieceColor,
    session::{record::GameRecord, GameResult, Outcome, SessionSnapshot},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientMessage {
    NewGame {
        color: PieceColor,
        difficulty: Difficulty,
        time_control: TimeControl,
        #[serde(default)]
        fen: Option<String>,
    },
    MakeMove {
        from: String,
        to: String,
    },
    Resign,
    OfferDraw,
    LeaveGame,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerMessage {
    GameStarted {
        game_id: String,
        your_color: PieceColor,
    },
    State(Box<SessionSnapshot>),
    Clock {
        white: u32,
        black: u32,
    },
    AiThinking,
    MoveRejected {
        reason: String,
    },
    DrawDeclined,
    GameEnd {
        result: GameResult,
        outcome: Outcome,
        moves_text: String,
    },
    History(Vec<GameRecord>),
    Error(String),
}

use dashmap::DashMap;
use gambit_core::engine::config::EngineConfig;
use gambit_core::session::record::GameRecordSink;
use shared::ServerMessage;
use std::sync::Arc;
use std::time::Duration;

pub mod lifecycle;
pub mod move_handler;
pub mod session;

pub use session::{LiveSession, Player, Tx};

pub struct AppState {
    pub players: DashMap<String, Player>,
    pub games: DashMap<String, Arc<LiveSession>>,
    pub player_to_game: DashMap<String, String>,
    pub engine_config: Arc<EngineConfig>,
    pub sink: Arc<dyn GameRecordSink>,
    pub tick_interval: Duration,
}

impl AppState {
    pub fn new(
        engine_config: Arc<EngineConfig>,
        sink: Arc<dyn GameRecordSink>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            players: DashMap::new(),
            games: DashMap::new(),
            player_to_game: DashMap::new(),
            engine_config,
            sink,
            tick_interval,
        }
    }

    pub fn check_rate_limit(&self, player_id: &str) -> bool {
        use std::time::Instant;
        if let Some(mut player) = self.players.get_mut(player_id) {
            let now = Instant::now();
            let elapsed = now.duration_since(player.last_msg_at).as_secs_f32();
            if elapsed < 0.1 {
                // Allow max 10 messages per second
                return false;
            }
            player.last_msg_at = now;
            true
        } else {
            false
        }
    }

    pub fn send(&self, player_id: &str, msg: ServerMessage) {
        if let Some(player) = self.players.get(player_id) {
            let _ = player.tx.send(msg);
        }
    }

    pub fn session_of(&self, player_id: &str) -> Option<Arc<LiveSession>> {
        let game_id = self.player_to_game.get(player_id)?.value().clone();
        self.games.get(&game_id).map(|entry| entry.value().clone())
    }
}

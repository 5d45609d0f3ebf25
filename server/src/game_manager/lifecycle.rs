use crate::game_manager::{session::Player, AppState, LiveSession};
use gambit_core::session::record::RecordError;
use gambit_core::session::{GameSession, SessionConfig};
use shared::ServerMessage;
use std::sync::Arc;
use std::time::{Duration, Instant};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);
const FINISHED_GAME_TTL: Duration = Duration::from_secs(3600);

impl AppState {
    pub fn add_player(&self, id: String, tx: crate::game_manager::Tx) {
        tracing::info!(player_id = %id, "Player added to AppState");
        self.players.insert(
            id,
            Player {
                tx,
                last_msg_at: Instant::now(),
            },
        );
    }

    pub async fn remove_player(&self, id: &str) {
        tracing::info!(player_id = %id, "Removing player from AppState");
        self.leave_game(id).await;
        self.players.remove(id);
    }

    /// Replaces whatever the player had running with a fresh session.
    pub async fn new_game(self: &Arc<Self>, player_id: &str, config: SessionConfig) {
        self.leave_game(player_id).await;

        let game_id = uuid::Uuid::new_v4().to_string();
        let user_color = config.user_color;
        let mut game = GameSession::new(config, self.sink.clone(), self.engine_config.clone());

        let start = match game.start() {
            Ok(start) => start,
            Err(err) => {
                self.send(player_id, ServerMessage::Error(err.to_string()));
                return;
            }
        };
        tracing::info!(
            player_id = %player_id,
            game_id = %game_id,
            color = %user_color,
            difficulty = %game.config().difficulty,
            "Game started"
        );

        self.send(
            player_id,
            ServerMessage::GameStarted {
                game_id: game_id.clone(),
                your_color: user_color,
            },
        );
        if let Some(err) = &start.fen_error {
            tracing::warn!(game_id = %game_id, error = %err, "Start position rejected, using standard start");
            self.send(player_id, ServerMessage::Error(err.to_string()));
        }

        let over = game.is_over();
        let live = Arc::new(LiveSession::new(game_id.clone(), player_id.to_string(), game));
        if over {
            let game = live.game.read().await;
            self.announce_end(&live, &game);
            return;
        }

        self.send(
            player_id,
            ServerMessage::State(Box::new(live.game.read().await.snapshot())),
        );
        self.games.insert(game_id.clone(), live.clone());
        self.player_to_game.insert(player_id.to_string(), game_id);

        self.spawn_clock_task(live.clone());
        if let Some(job) = start.ai_job {
            self.send(player_id, ServerMessage::AiThinking);
            self.spawn_ai_task(live, job);
        }
    }

    pub async fn handle_resign(&self, player_id: &str) {
        let Some(live) = self.session_of(player_id) else {
            return;
        };
        let mut game = live.game.write().await;
        match game.resign() {
            Ok(()) => {
                tracing::info!(player_id = %player_id, game_id = %live.game_id, "Player resigned");
                live.abort_tasks();
                self.announce_end(&live, &game);
            }
            Err(err) => {
                tracing::debug!(game_id = %live.game_id, error = %err, "Resignation ignored");
            }
        }
    }

    pub async fn handle_draw_offer(&self, player_id: &str) {
        let Some(live) = self.session_of(player_id) else {
            return;
        };
        live.touch();
        let mut game = live.game.write().await;
        let accepted = {
            let mut rng = rand::thread_rng();
            game.offer_draw(&mut rng)
        };
        match accepted {
            Ok(true) => {
                tracing::info!(game_id = %live.game_id, "Draw offer accepted");
                live.abort_tasks();
                self.announce_end(&live, &game);
            }
            Ok(false) => {
                tracing::info!(game_id = %live.game_id, "Draw offer declined");
                self.send(player_id, ServerMessage::DrawDeclined);
            }
            Err(err) => self.send(player_id, ServerMessage::Error(err.to_string())),
        }
    }

    /// Tears down the player's session. An unfinished game is abandoned.
    pub async fn leave_game(&self, player_id: &str) {
        let Some((_, game_id)) = self.player_to_game.remove(player_id) else {
            return;
        };
        tracing::info!(player_id = %player_id, game_id = %game_id, "Cleaning up game session");
        if let Some((_, live)) = self.games.remove(&game_id) {
            live.abort_tasks();
            let mut game = live.game.write().await;
            if game.abandon() {
                tracing::info!(game_id = %game_id, player_id = %player_id, "In-progress game abandoned");
                self.announce_end(&live, &game);
            }
        }
    }

    /// Reads stored records on a blocking thread.
    pub async fn handle_history(&self, player_id: &str) {
        let sink = self.sink.clone();
        let history = tokio::task::spawn_blocking(move || sink.history())
            .await
            .unwrap_or_else(|err| Err(RecordError::Io(std::io::Error::other(err.to_string()))));
        match history {
            Ok(records) => self.send(player_id, ServerMessage::History(records)),
            Err(err) => {
                tracing::warn!(player_id = %player_id, error = %err, "Could not read game history");
                self.send(player_id, ServerMessage::Error(err.to_string()));
            }
        }
    }

    /// Sends the final state and the result line.
    pub(crate) fn announce_end(&self, live: &LiveSession, game: &GameSession) {
        let snapshot = game.snapshot();
        let end = match (snapshot.result, snapshot.outcome) {
            (Some(result), Some(outcome)) => Some(ServerMessage::GameEnd {
                result,
                outcome,
                moves_text: snapshot.moves_text.clone(),
            }),
            _ => None,
        };
        self.send(&live.player_id, ServerMessage::State(Box::new(snapshot)));
        if let Some(end) = end {
            tracing::info!(game_id = %live.game_id, player_id = %live.player_id, "Game over");
            self.send(&live.player_id, end);
        }
    }

    pub fn spawn_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                let now = Instant::now();
                let mut games_to_remove = Vec::new();

                for entry in self.games.iter() {
                    let live = entry.value();
                    let idle = now.duration_since(live.last_activity());
                    if idle > FINISHED_GAME_TTL {
                        games_to_remove.push(live.clone());
                    }
                }

                for live in games_to_remove {
                    tracing::info!(game_id = %live.game_id, "Cleaning up inactive game");
                    self.leave_game(&live.player_id).await;
                }
            }
        });
    }
}

use crate::game_manager::{AppState, LiveSession};
use gambit_core::engine::{EngineError, Move};
use gambit_core::session::{AiJob, SessionError, TickOutcome};
use gambit_core::worker::GameWorker;
use shared::ServerMessage;
use std::sync::Arc;

impl AppState {
    pub async fn handle_move(self: &Arc<Self>, player_id: &str, from: &str, to: &str) {
        let Some(live) = self.session_of(player_id) else {
            self.send(player_id, ServerMessage::Error("no game in progress".to_string()));
            return;
        };
        live.touch();

        let mut game = live.game.write().await;
        match game.apply_user_move(from, to) {
            Ok(job) => {
                tracing::debug!(game_id = %live.game_id, from = %from, to = %to, "User move applied");
                if game.is_over() {
                    live.abort_tasks();
                    self.announce_end(&live, &game);
                    return;
                }
                self.send(player_id, ServerMessage::State(Box::new(game.snapshot())));
                drop(game);
                if let Some(job) = job {
                    self.send(player_id, ServerMessage::AiThinking);
                    self.spawn_ai_task(live, job);
                }
            }
            Err(err) => {
                tracing::debug!(game_id = %live.game_id, from = %from, to = %to, error = %err, "Move rejected");
                self.send(
                    player_id,
                    ServerMessage::MoveRejected {
                        reason: err.to_string(),
                    },
                );
            }
        }
    }

    /// Waits out the job's thinking delay, searches on a blocking thread and
    /// applies the answer.
    pub fn spawn_ai_task(self: &Arc<Self>, live: Arc<LiveSession>, job: AiJob) {
        let config = self.engine_config.clone();
        self.spawn_ai_task_with(live, job, move |job| {
            GameWorker::new(config.clone()).run(job)
        });
    }

    /// Retries issued by the session run inside the same task, so the
    /// registered abort handle covers every attempt.
    pub(crate) fn spawn_ai_task_with<F>(self: &Arc<Self>, live: Arc<LiveSession>, job: AiJob, compute: F)
    where
        F: Fn(&AiJob) -> Result<Move, EngineError> + Send + Sync + 'static,
    {
        let state = self.clone();
        let task_live = live.clone();
        let compute = Arc::new(compute);
        let handle = tokio::spawn(async move {
            let live = task_live;
            let mut job = job;
            loop {
                tokio::time::sleep(job.delay).await;

                let compute = compute.clone();
                let blocking_job = job.clone();
                let result = tokio::task::spawn_blocking(move || compute(&blocking_job))
                    .await
                    .unwrap_or_else(|err| Err(EngineError::Aborted(err.to_string())));

                if let Err(err) = &result {
                    tracing::warn!(game_id = %live.game_id, error = %err, "Computer move failed");
                }

                let mut game = live.game.write().await;
                match game.apply_ai_result(job.ticket, result) {
                    Ok(next) => {
                        if game.is_over() {
                            live.abort_clock_task();
                            state.announce_end(&live, &game);
                            return;
                        }
                        state.send(&live.player_id, ServerMessage::State(Box::new(game.snapshot())));
                        let Some(next) = next else {
                            return;
                        };
                        tracing::info!(game_id = %live.game_id, job = next.ticket.job, "Retrying computer move");
                        job = next;
                    }
                    Err(SessionError::StaleAiResult) => {
                        tracing::debug!(game_id = %live.game_id, "Discarded stale computer move");
                        return;
                    }
                    Err(err) => {
                        tracing::warn!(game_id = %live.game_id, error = %err, "Computer move not applied");
                        return;
                    }
                }
            }
        });
        live.set_ai_task(handle.abort_handle());
    }

    /// Ticks the session once per `tick_interval` until it stops running.
    pub fn spawn_clock_task(self: &Arc<Self>, live: Arc<LiveSession>) {
        let state = self.clone();
        let task_live = live.clone();
        let handle = tokio::spawn(async move {
            let live = task_live;
            let mut interval = tokio::time::interval(state.tick_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                let mut game = live.game.write().await;
                match game.tick() {
                    TickOutcome::Running(clock) => {
                        state.send(
                            &live.player_id,
                            ServerMessage::Clock {
                                white: clock.white,
                                black: clock.black,
                            },
                        );
                    }
                    TickOutcome::TimedOut { loser } => {
                        tracing::info!(game_id = %live.game_id, loser = %loser, "Clock ran out");
                        live.abort_ai_task();
                        state.announce_end(&live, &game);
                        break;
                    }
                    TickOutcome::Idle => break,
                }
            }
        });
        live.set_clock_task(handle.abort_handle());
    }
}

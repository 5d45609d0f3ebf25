use gambit_core::session::GameSession;
use shared::ServerMessage;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::{mpsc, RwLock};
use tokio::task::AbortHandle;

pub type Tx = mpsc::UnboundedSender<ServerMessage>;

pub struct Player {
    pub tx: Tx,
    pub last_msg_at: Instant,
}

#[derive(Default)]
struct SessionTasks {
    clock: Option<AbortHandle>,
    ai: Option<AbortHandle>,
}

/// A running game plus the background tasks that drive it.
pub struct LiveSession {
    pub game_id: String,
    pub player_id: String,
    pub game: RwLock<GameSession>,
    tasks: Mutex<SessionTasks>,
    last_activity: Mutex<Instant>,
}

impl LiveSession {
    pub fn new(game_id: String, player_id: String, game: GameSession) -> Self {
        Self {
            game_id,
            player_id,
            game: RwLock::new(game),
            tasks: Mutex::new(SessionTasks::default()),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    pub fn touch(&self) {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    pub fn last_activity(&self) -> Instant {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_clock_task(&self, handle: AbortHandle) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = tasks.clock.replace(handle) {
            old.abort();
        }
    }

    pub fn set_ai_task(&self, handle: AbortHandle) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = tasks.ai.replace(handle) {
            old.abort();
        }
    }

    #[cfg(test)]
    pub fn has_ai_task(&self) -> bool {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ai
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    pub fn abort_clock_task(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = tasks.clock.take() {
            handle.abort();
        }
    }

    pub fn abort_ai_task(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = tasks.ai.take() {
            handle.abort();
        }
    }

    /// Cancels the clock and any computation in flight.
    pub fn abort_tasks(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = tasks.clock.take() {
            handle.abort();
        }
        if let Some(handle) = tasks.ai.take() {
            handle.abort();
        }
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

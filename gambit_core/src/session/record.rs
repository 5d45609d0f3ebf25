//! Finished-game records and where they go.

use crate::engine::config::Difficulty;
use crate::logic::board::PieceColor;
use crate::session::{GameResult, Outcome};
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub color: PieceColor,
    pub difficulty: Difficulty,
    pub time_control_minutes: u8,
    pub result: GameResult,
    pub outcome: Outcome,
    pub moves_text: String,
    /// Unix time in milliseconds when the game ended.
    #[serde(default)]
    pub finished_at_ms: u64,
}

impl GameRecord {
    #[must_use]
    pub fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record storage failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub trait GameRecordSink: Send + Sync {
    fn save_game(&self, record: &GameRecord) -> Result<(), RecordError>;

    /// Stored records, most recent first.
    fn history(&self) -> Result<Vec<GameRecord>, RecordError>;
}

/// Keeps records in process memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<GameRecord>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GameRecordSink for MemorySink {
    fn save_game(&self, record: &GameRecord) -> Result<(), RecordError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn history(&self) -> Result<Vec<GameRecord>, RecordError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.iter().rev().cloned().collect())
    }
}

/// Saves through `sink`, logging instead of failing.
pub(crate) fn save_or_log(sink: &dyn GameRecordSink, record: &GameRecord) {
    if let Err(err) = sink.save_game(record) {
        warn!("Could not save game record: {err}");
    }
}

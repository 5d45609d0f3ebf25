use gambit_core::session::record::{GameRecord, GameRecordSink, RecordError};
use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

/// Appends one JSON object per finished game to a file.
pub struct JsonLinesSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GameRecordSink for JsonLinesSink {
    fn save_game(&self, record: &GameRecord) -> Result<(), RecordError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "Game record saved");
        Ok(())
    }

    fn history(&self) -> Result<Vec<GameRecord>, RecordError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut records = Vec::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<GameRecord>(&line) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), line = n + 1, error = %err, "Skipping unreadable game record");
                }
            }
        }
        records.reverse();
        Ok(records)
    }
}

/// Hands records to a writer task so sessions never wait on storage.
/// Reads go straight to the inner sink; call them from a blocking thread.
pub struct BackgroundSink {
    inner: Arc<dyn GameRecordSink>,
    tx: mpsc::UnboundedSender<GameRecord>,
}

impl BackgroundSink {
    /// Starts the writer task. Must be called inside a tokio runtime.
    pub fn spawn(inner: Arc<dyn GameRecordSink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<GameRecord>();
        let writer = inner.clone();
        tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                let sink = writer.clone();
                match tokio::task::spawn_blocking(move || sink.save_game(&record)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => tracing::warn!(error = %err, "Game record not saved"),
                    Err(err) => tracing::warn!(error = %err, "Record writer panicked"),
                }
            }
        });
        Self { inner, tx }
    }
}

impl GameRecordSink for BackgroundSink {
    fn save_game(&self, record: &GameRecord) -> Result<(), RecordError> {
        self.tx.send(record.clone()).map_err(|_| {
            RecordError::Io(io::Error::new(ErrorKind::BrokenPipe, "record writer stopped"))
        })
    }

    fn history(&self) -> Result<Vec<GameRecord>, RecordError> {
        self.inner.history()
    }
}

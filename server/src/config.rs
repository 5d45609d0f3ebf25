use clap::Parser;
use gambit_core::engine::config::EngineConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Parser)]
#[command(name = "gambit-server", about = "Play timed chess against the computer over WebSocket")]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "GAMBIT_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    /// JSON-lines file finished games are appended to.
    #[arg(long, env = "GAMBIT_RECORDS", default_value = "games.jsonl")]
    pub records: PathBuf,

    /// Optional engine tuning file (piece values are scales of the defaults).
    #[arg(long, env = "GAMBIT_ENGINE_CONFIG")]
    pub engine_config: Option<PathBuf>,

    /// Length of one clock second, in milliseconds.
    #[arg(long, env = "GAMBIT_TICK_MS", default_value_t = 1000)]
    pub tick_ms: u64,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("cannot read {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid engine config: {0}")]
    EngineConfig(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn load_engine_config(&self) -> Result<EngineConfig, ServerError> {
        let Some(path) = &self.engine_config else {
            return Ok(EngineConfig::default());
        };
        let json = std::fs::read_to_string(path).map_err(|source| ServerError::ReadConfig {
            path: path.clone(),
            source,
        })?;
        Ok(EngineConfig::load_from_json(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::parse_from(["gambit-server"]);
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert!(config.engine_config.is_none());
        assert_eq!(config.load_engine_config().unwrap().ai_retry_limit, 1);
    }

    #[test]
    fn test_engine_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"think_delay_per_ply_ms": 0, "val_queen": 2.0}}"#).unwrap();

        let config = ServerConfig::parse_from([
            "gambit-server",
            "--engine-config",
            file.path().to_str().unwrap(),
            "--tick-ms",
            "50",
        ]);
        let engine = config.load_engine_config().unwrap();
        assert_eq!(engine.think_delay_per_ply_ms, 0);
        assert_eq!(engine.val_queen, 18.0);
        assert_eq!(config.tick_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_missing_engine_config_file() {
        let config =
            ServerConfig::parse_from(["gambit-server", "--engine-config", "/nonexistent/engine.json"]);
        assert!(matches!(
            config.load_engine_config(),
            Err(ServerError::ReadConfig { .. })
        ));
    }
}

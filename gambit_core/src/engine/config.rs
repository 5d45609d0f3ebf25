use crate::engine::eval_constants::{
    MATE_SCORE, MOBILITY_WEIGHT, VAL_BISHOP, VAL_KING, VAL_KNIGHT, VAL_PAWN, VAL_QUEEN, VAL_ROOK,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown difficulty: {0:?}")]
    UnknownDifficulty(String),
    #[error("unsupported time control: {0} minutes (expected 3, 5 or 8)")]
    UnsupportedTimeControl(u8),
}

/// Search depth in plies plus how much of the ranked move list the
/// selector may pick from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub depth: u8,
    pub random_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Impossible,
}

impl Difficulty {
    pub const ALL: [Self; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Impossible];

    #[must_use]
    pub const fn profile(self) -> DifficultyProfile {
        match self {
            Self::Easy => DifficultyProfile {
                depth: 1,
                random_factor: 0.5,
            },
            Self::Medium => DifficultyProfile {
                depth: 2,
                random_factor: 0.3,
            },
            Self::Hard => DifficultyProfile {
                depth: 3,
                random_factor: 0.1,
            },
            Self::Impossible => DifficultyProfile {
                depth: 4,
                random_factor: 0.0,
            },
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Impossible => "impossible",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownDifficulty(s.to_string()))
    }
}

/// Minutes on each clock at the start of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TimeControl(u8);

impl TimeControl {
    pub const ALLOWED_MINUTES: [u8; 3] = [3, 5, 8];

    #[must_use]
    pub const fn minutes(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn seconds(self) -> u32 {
        self.0 as u32 * 60
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for TimeControl {
    type Error = ConfigError;

    fn try_from(minutes: u8) -> Result<Self, Self::Error> {
        if Self::ALLOWED_MINUTES.contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(ConfigError::UnsupportedTimeControl(minutes))
        }
    }
}

impl From<TimeControl> for u8 {
    fn from(tc: TimeControl) -> Self {
        tc.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Evaluation Parameters
    pub val_pawn: f64,
    pub val_knight: f64,
    pub val_bishop: f64,
    pub val_rook: f64,
    pub val_queen: f64,
    pub val_king: f64,
    pub mate_score: f64,
    pub mobility_weight: f64,

    // Pacing (milliseconds)
    pub think_delay_per_ply_ms: u64,

    // Opponent behaviour
    pub draw_accept_probability: f64,
    pub ai_retry_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            val_pawn: VAL_PAWN,
            val_knight: VAL_KNIGHT,
            val_bishop: VAL_BISHOP,
            val_rook: VAL_ROOK,
            val_queen: VAL_QUEEN,
            val_king: VAL_KING,
            mate_score: MATE_SCORE,
            mobility_weight: MOBILITY_WEIGHT,

            think_delay_per_ply_ms: 500,

            draw_accept_probability: 0.5,
            ai_retry_limit: 1,
        }
    }
}

#[derive(Deserialize)]
struct EngineConfigJson {
    val_pawn: Option<f64>,
    val_knight: Option<f64>,
    val_bishop: Option<f64>,
    val_rook: Option<f64>,
    val_queen: Option<f64>,
    val_king: Option<f64>,
    mate_score: Option<f64>,
    mobility_weight: Option<f64>,

    think_delay_per_ply_ms: Option<u64>,

    draw_accept_probability: Option<f64>,
    ai_retry_limit: Option<u32>,
}

impl EngineConfig {
    /// Piece values in `json_str` are scales applied to the defaults; every
    /// other field is an absolute override.
    pub fn load_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        let json_config: EngineConfigJson = serde_json::from_str(json_str)?;
        let default = Self::default();

        Ok(Self {
            val_pawn: apply_scale(default.val_pawn, json_config.val_pawn),
            val_knight: apply_scale(default.val_knight, json_config.val_knight),
            val_bishop: apply_scale(default.val_bishop, json_config.val_bishop),
            val_rook: apply_scale(default.val_rook, json_config.val_rook),
            val_queen: apply_scale(default.val_queen, json_config.val_queen),
            val_king: apply_scale(default.val_king, json_config.val_king),
            mate_score: json_config.mate_score.unwrap_or(default.mate_score),
            mobility_weight: json_config
                .mobility_weight
                .unwrap_or(default.mobility_weight),

            think_delay_per_ply_ms: json_config
                .think_delay_per_ply_ms
                .unwrap_or(default.think_delay_per_ply_ms),

            draw_accept_probability: json_config
                .draw_accept_probability
                .unwrap_or(default.draw_accept_probability)
                .clamp(0.0, 1.0),
            ai_retry_limit: json_config.ai_retry_limit.unwrap_or(default.ai_retry_limit),
        })
    }

    /// Simulated thinking time before the computer answers at `depth`,
    /// proportional to the depth.
    #[must_use]
    pub fn ai_delay(&self, depth: u8) -> Duration {
        Duration::from_millis(self.think_delay_per_ply_ms.saturating_mul(u64::from(depth)))
    }

    /// No artificial pacing. Used by tests and offline analysis.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            think_delay_per_ply_ms: 0,
            ..Self::default()
        }
    }
}

fn apply_scale(default_val: f64, scale: Option<f64>) -> f64 {
    scale.map_or(default_val, |s| default_val * s)
}

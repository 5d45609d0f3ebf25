use crate::engine::config::TimeControl;
use crate::logic::board::PieceColor;
use serde::{Deserialize, Serialize};

/// Remaining whole seconds for each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    pub white: u32,
    pub black: u32,
}

impl GameClock {
    #[must_use]
    pub const fn new(time_control: TimeControl) -> Self {
        let seconds = time_control.seconds();
        Self {
            white: seconds,
            black: seconds,
        }
    }

    #[must_use]
    pub const fn remaining(&self, color: PieceColor) -> u32 {
        match color {
            PieceColor::White => self.white,
            PieceColor::Black => self.black,
        }
    }

    /// Takes one second from `color`, clamped at zero. Returns true once
    /// that clock has run out.
    pub fn tick(&mut self, color: PieceColor) -> bool {
        let slot = match color {
            PieceColor::White => &mut self.white,
            PieceColor::Black => &mut self.black,
        };
        *slot = slot.saturating_sub(1);
        *slot == 0
    }
}

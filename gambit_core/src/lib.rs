//! Computer-opponent core for timed chess games: position evaluation,
//! alpha-beta search, difficulty-aware move selection and the session
//! state machine that drives clocks and turns.

pub mod engine;
pub mod logic;
pub mod session;
pub mod worker;

pub mod board;
pub mod game;
pub mod position;
pub mod rules;

//! DoodleRush session core.
//!
//! Rooms, rounds, scoring and the powerup economy for a real-time
//! drawing-and-guessing party game, served over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

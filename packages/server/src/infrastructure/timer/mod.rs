//! タイマーの実装
//!
//! - `tokio_task`: tokio のタスクと `sleep` を使った実装

pub mod tokio_task;

pub use tokio_task::TokioTimerScheduler;

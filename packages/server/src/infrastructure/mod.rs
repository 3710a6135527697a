//! Infrastructure layer
//!
//! ドメイン層の trait（RoomRepository / MessagePusher / TimerScheduler）の具体的な実装と、
//! ワイヤ上の表現（DTO）。

pub mod dto;
pub mod message_pusher;
pub mod repository;
pub mod timer;

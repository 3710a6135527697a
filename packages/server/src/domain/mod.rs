//! Domain layer
//!
//! ゲームのルール（得点・価格・パワーアップ・回答判定）と集約（Room / Player）。
//! I/O を持たず、通知は `Outbox` として返す。
//! Repository / MessagePusher / TimerScheduler の trait もここで定義する。

pub mod drawing;
pub mod economy;
pub mod entity;
pub mod error;
pub mod event;
pub mod guess;
pub mod message_pusher;
pub mod powerup;
pub mod pricing;
pub mod repository;
pub mod scheduler;
pub mod scoring;
pub mod value_object;
pub mod words;

pub use drawing::{CanvasBounds, DrawingEvent, StrokeKind};
pub use entity::{
    ActiveEffect, Cooldown, Difficulty, EffectSlot, GameState, GameStatus, GlobalCooldown, Player,
    Room, WordChoice,
};
pub use error::{
    MembershipError, MessagePushError, PowerupError, RepositoryError, TargetRejection,
    ValueObjectError,
};
pub use event::{EffectNotice, GameSnapshot, Outbound, Outbox, ScoreLine, ServerEvent};
pub use guess::{GuessOutcome, match_guess};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use powerup::{PowerupKind, PowerupSpec, UsableBy};
pub use repository::{RoomRepository, SharedRoom};
pub use scheduler::{TimerKey, TimerPurpose, TimerScheduler, TimerTask};
pub use scoring::{Bonus, GuessScore, ScoringEngine};
pub use value_object::{AvatarId, PlayerId, PlayerName, RoomCode, RoomCodeFactory};

//! ドメイン層のエラー定義

use thiserror::Error;

use super::powerup::PowerupKind;

/// 値オブジェクト生成時のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("player id must not be empty")]
    EmptyPlayerId,

    #[error("name must not be empty")]
    EmptyPlayerName,

    #[error("name must be at most {max} characters")]
    PlayerNameTooLong { max: usize },

    #[error("invalid room code '{0}'")]
    InvalidRoomCode(String),
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("room code '{0}' is already in use")]
    DuplicateRoomCode(String),
}

/// MessagePusher 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    Encode(String),
}

/// ルームへの参加可否の判定エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    #[error("room is full")]
    Full,

    #[error("game already started")]
    AlreadyStarted,

    #[error("room is closed")]
    Closed,

    #[error("player is already in this room")]
    AlreadyMember,
}

/// 対象指定が不正な理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TargetRejection {
    #[error("this powerup needs a target")]
    Missing,

    #[error("this powerup does not take a target")]
    NotAccepted,

    #[error("you cannot target yourself")]
    SelfTarget,

    #[error("target is not in this room")]
    NotMember,

    #[error("the drawer cannot be targeted")]
    Drawer,
}

/// パワーアップ操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowerupError {
    #[error("player not found")]
    PlayerNotFound,

    #[error("you don't own {0}")]
    NotOwned(PowerupKind),

    #[error("not enough points: need {price}, have {score}")]
    InsufficientFunds { price: i64, score: i64 },

    #[error("{kind} can only be used by the {role}")]
    WrongRole {
        kind: PowerupKind,
        role: &'static str,
    },

    #[error("{kind} is on cooldown for {remaining_ms} ms")]
    PersonalCooldown { kind: PowerupKind, remaining_ms: i64 },

    #[error("{kind} was used recently in this room, wait {remaining_ms} ms")]
    GlobalCooldown { kind: PowerupKind, remaining_ms: i64 },

    #[error("{kind} can be used at most {max} times per round")]
    RoundLimitReached { kind: PowerupKind, max: u32 },

    #[error("{0}")]
    InvalidTarget(#[from] TargetRejection),

    #[error("{0}")]
    Unavailable(&'static str),
}

impl PowerupError {
    /// 役割違反（ログのみで無視してよいもの）かどうか
    pub fn is_authorization(&self) -> bool {
        matches!(self, PowerupError::WrongRole { .. })
    }
}

//! UseCase 層のエラー定義
//!
//! エラーは 3 種類に分類される。
//! - Validation: 操作したプレイヤーにだけエラー通知を返す
//! - Authorization: ログに残して状態は変えない（通知は返してもよい）
//! - NotFound: ルームやプレイヤーが消えていた。何もせずに抜ける

use thiserror::Error;

use crate::domain::{GameStatus, PowerupError, RepositoryError, ServerEvent, ValueObjectError};

/// エラーの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Authorization,
    NotFound,
}

/// UI 層がエラーを通知に変換するための共通インターフェース
pub trait CommandError: std::error::Error {
    fn class(&self) -> ErrorClass;

    /// 操作したプレイヤーに返す通知
    fn notice(&self) -> ServerEvent {
        ServerEvent::room_error(self.to_string())
    }
}

/// ルーム作成のエラー
#[derive(Debug, Error)]
pub enum CreateRoomError {
    #[error("Invalid name: {0}")]
    InvalidName(ValueObjectError),

    #[error("You are already in a room")]
    AlreadyInRoom,

    #[error("Could not allocate a room code after {attempts} attempts")]
    CodeExhausted { attempts: usize },

    #[error("Could not generate a room code: {0}")]
    CodeGeneration(ValueObjectError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CommandError for CreateRoomError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Validation
    }
}

/// ルーム参加のエラー
#[derive(Debug, Error)]
pub enum JoinRoomError {
    #[error("Invalid name: {0}")]
    InvalidName(ValueObjectError),

    #[error("Invalid room code")]
    InvalidCode(ValueObjectError),

    #[error("Room {0} not found")]
    NotFound(String),

    #[error("Room is full")]
    Full,

    #[error("Game already in progress")]
    AlreadyStarted,

    #[error("You are already in a room")]
    AlreadyInRoom,
}

impl CommandError for JoinRoomError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Validation
    }
}

/// ゲーム進行系コマンド（開始・リスタート・お題選択・チャット・描画・準備完了）のエラー
#[derive(Debug, Error)]
pub enum GameCommandError {
    #[error("You are not in a room")]
    NotInRoom,

    #[error("Only the host can do that")]
    NotHost,

    #[error("Only the drawer can do that")]
    NotDrawer,

    #[error("Not allowed while the game is {0:?}")]
    InvalidPhase(GameStatus),

    #[error("Need at least {required} players to start ({present} present)")]
    NotEnoughPlayers { required: usize, present: usize },

    #[error("Rounds must be between 1 and {max}")]
    InvalidRounds { max: u32 },

    #[error("Invalid round duration: {0} ms")]
    InvalidDuration(u64),

    #[error("That word was not offered")]
    WordNotOffered,
}

impl CommandError for GameCommandError {
    fn class(&self) -> ErrorClass {
        match self {
            GameCommandError::NotInRoom => ErrorClass::NotFound,
            GameCommandError::NotHost | GameCommandError::NotDrawer => ErrorClass::Authorization,
            _ => ErrorClass::Validation,
        }
    }
}

/// パワーアップ操作のエラー
#[derive(Debug, Error)]
pub enum PowerupCommandError {
    #[error("You are not in a room")]
    NotInRoom,

    #[error(transparent)]
    Rejected(#[from] PowerupError),
}

impl CommandError for PowerupCommandError {
    fn class(&self) -> ErrorClass {
        match self {
            PowerupCommandError::NotInRoom => ErrorClass::NotFound,
            PowerupCommandError::Rejected(e) if e.is_authorization() => ErrorClass::Authorization,
            PowerupCommandError::Rejected(_) => ErrorClass::Validation,
        }
    }

    fn notice(&self) -> ServerEvent {
        ServerEvent::powerup_error(self.to_string())
    }
}

/// ルーム詳細取得のエラー
#[derive(Debug, Error)]
pub enum GetRoomDetailError {
    #[error("room not found")]
    RoomNotFound,
}

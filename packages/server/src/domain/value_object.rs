//! Value Objects
//!
//! プリミティブ型をラップし、生成時にバリデーションを行う値オブジェクト群。

use std::fmt;

use rand::{distributions::Uniform, prelude::*, rngs::OsRng};
use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

/// プレイヤー名の最大文字数
pub const MAX_PLAYER_NAME_LEN: usize = 20;

/// 接続ハンドル（プレイヤー ID）
///
/// WebSocket 接続ごとにサーバー側で発行される。
/// 再接続は新しいハンドルを発行するため、同一人物でも別 ID になる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// 既存の文字列から PlayerId を作成
    pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyPlayerId);
        }
        Ok(Self(value))
    }

    /// UUID v4 で新しいハンドルを発行
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PlayerId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// ルームコード
///
/// 大文字英数字のみ。入力は大文字に正規化される。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// 入力文字列を正規化してルームコードに変換
    pub fn parse(input: &str) -> Result<Self, ValueObjectError> {
        let normalized = input.trim().to_uppercase();
        if normalized.is_empty()
            || normalized.len() > 16
            || !normalized.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ValueObjectError::InvalidRoomCode(input.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RoomCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        RoomCode::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// ルームコードの生成
pub struct RoomCodeFactory;

impl RoomCodeFactory {
    /// `alphabet` から `length` 文字をランダムに選ぶ（衝突の確認は呼び出し側で行う）
    pub fn generate(alphabet: &str, length: usize) -> Result<RoomCode, ValueObjectError> {
        let chars: Vec<char> = alphabet.chars().collect();
        if chars.is_empty() {
            return Err(ValueObjectError::InvalidRoomCode(String::new()));
        }
        let mut rng = OsRng;
        let dist = Uniform::from(0..chars.len());
        let code: String = (0..length).map(|_| chars[dist.sample(&mut rng)]).collect();
        RoomCode::parse(&code)
    }
}

/// プレイヤー表示名（前後の空白を除去して 1〜20 文字）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(value: &str) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyPlayerName);
        }
        if trimmed.chars().count() > MAX_PLAYER_NAME_LEN {
            return Err(ValueObjectError::PlayerNameTooLong {
                max: MAX_PLAYER_NAME_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// アバター識別子（クライアント側の画像セットのインデックス）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvatarId(pub u32);

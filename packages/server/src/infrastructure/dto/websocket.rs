//! WebSocket message DTOs.
//!
//! 受信フレームは `{"event": "<name>", "payload": {...}}` の封筒。
//! 封筒を先に読み、イベント名ごとにペイロードを型付きの構造体へ変換する。
//! ペイロードが省略された場合は空オブジェクトとして扱う。

use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use crate::domain::{MessagePushError, PowerupKind, ServerEvent};

/// 受信フレームの解釈に失敗した
#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("frame is not a JSON envelope: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    #[error("invalid payload for '{event}': {source}")]
    InvalidPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateRoomPayload {
    pub name: String,
    #[serde(default)]
    pub avatar: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JoinRoomPayload {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyPayload {
    pub is_ready: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartGamePayload {
    pub rounds: Option<u32>,
    /// ミリ秒
    pub round_duration: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectWordPayload {
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatPayload {
    #[serde(alias = "message")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerupPayload {
    pub powerup_id: PowerupKind,
    #[serde(default)]
    pub target: Option<String>,
}

/// 描画イベント（未検証）
///
/// 1 件ずつ変換するので、壊れたイベントがあってもバッチ全体は捨てない。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DrawingBatchPayload {
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawDrawingEvent {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<u32>,
}

/// クライアントから届くコマンド
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    CreateRoom(CreateRoomPayload),
    JoinRoom(JoinRoomPayload),
    LeaveRoom,
    SetReady(ReadyPayload),
    StartGame(StartGamePayload),
    RestartGame,
    SelectWord(SelectWordPayload),
    Chat(ChatPayload),
    GetPrice(PowerupPayload),
    Purchase(PowerupPayload),
    Activate(PowerupPayload),
    DrawingBatch(DrawingBatchPayload),
    ClearDrawing,
}

fn payload<T: DeserializeOwned>(event: &str, value: serde_json::Value) -> Result<T, CommandParseError> {
    let value = if value.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        value
    };
    serde_json::from_value(value).map_err(|source| CommandParseError::InvalidPayload {
        event: event.to_string(),
        source,
    })
}

impl ClientCommand {
    /// 受信した文字列フレームを解釈する
    pub fn parse(text: &str) -> Result<Self, CommandParseError> {
        let Envelope { event, payload: body } =
            serde_json::from_str(text).map_err(CommandParseError::InvalidJson)?;
        let command = match event.as_str() {
            "room.create" => ClientCommand::CreateRoom(payload(&event, body)?),
            "room.join" => ClientCommand::JoinRoom(payload(&event, body)?),
            "room.leave" => ClientCommand::LeaveRoom,
            "player.ready" => ClientCommand::SetReady(payload(&event, body)?),
            "game.start" => ClientCommand::StartGame(payload(&event, body)?),
            "game.restart" => ClientCommand::RestartGame,
            "word.select" => ClientCommand::SelectWord(payload(&event, body)?),
            "chat.message" => ClientCommand::Chat(payload(&event, body)?),
            "powerup.getPrice" => ClientCommand::GetPrice(payload(&event, body)?),
            "powerup.purchase" => ClientCommand::Purchase(payload(&event, body)?),
            "powerup.activate" => ClientCommand::Activate(payload(&event, body)?),
            "drawing.batch" => ClientCommand::DrawingBatch(payload(&event, body)?),
            "drawing.clear" => ClientCommand::ClearDrawing,
            _ => return Err(CommandParseError::UnknownEvent(event)),
        };
        Ok(command)
    }

    /// ログ用のイベント名
    pub fn name(&self) -> &'static str {
        match self {
            ClientCommand::CreateRoom(_) => "room.create",
            ClientCommand::JoinRoom(_) => "room.join",
            ClientCommand::LeaveRoom => "room.leave",
            ClientCommand::SetReady(_) => "player.ready",
            ClientCommand::StartGame(_) => "game.start",
            ClientCommand::RestartGame => "game.restart",
            ClientCommand::SelectWord(_) => "word.select",
            ClientCommand::Chat(_) => "chat.message",
            ClientCommand::GetPrice(_) => "powerup.getPrice",
            ClientCommand::Purchase(_) => "powerup.purchase",
            ClientCommand::Activate(_) => "powerup.activate",
            ClientCommand::DrawingBatch(_) => "drawing.batch",
            ClientCommand::ClearDrawing => "drawing.clear",
        }
    }
}

/// 送信フレームに直列化する
pub fn encode_event(event: &ServerEvent) -> Result<String, MessagePushError> {
    serde_json::to_string(event).map_err(|e| MessagePushError::Encode(e.to_string()))
}

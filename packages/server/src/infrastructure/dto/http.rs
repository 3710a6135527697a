//! HTTP API response DTOs.

use serde::Serialize;

/// `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthDto {
    pub status: String,
    pub rooms: usize,
    pub connections: usize,
}

/// `GET /api/rooms` の 1 件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub code: String,
    pub status: String,
    pub player_count: usize,
    pub round: u32,
    pub max_rounds: u32,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummaryDto {
    pub id: String,
    pub name: String,
    pub score: i64,
    pub is_ready: bool,
    pub is_host: bool,
    pub is_drawer: bool,
}

/// `GET /api/rooms/{code}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub code: String,
    pub host: String,
    pub status: String,
    pub round: u32,
    pub max_rounds: u32,
    pub round_duration_ms: u64,
    pub display_word: Option<String>,
    pub players: Vec<PlayerSummaryDto>,
    pub drawing_events: usize,
    pub created_at: String,
    pub last_activity: String,
}

/// `GET /api/stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub total_rooms: usize,
    pub total_players: usize,
}

//! Conversion logic between DTOs and domain entities.

use doodlerush_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::{CanvasBounds, DrawingEvent, GameStatus, Player, Room};
use crate::infrastructure::dto::{
    http::{PlayerSummaryDto, RoomDetailDto, RoomSummaryDto},
    websocket::{DrawingBatchPayload, RawDrawingEvent},
};

// ========================================
// DTO → Domain Entity
// ========================================

impl RawDrawingEvent {
    pub fn into_validated(self, bounds: &CanvasBounds) -> Option<DrawingEvent> {
        DrawingEvent::validated(self.x, self.y, &self.kind, self.color, self.size, bounds)
    }
}

impl DrawingBatchPayload {
    /// 読めないイベントと範囲外のイベントを落とす
    pub fn into_valid_events(self, bounds: &CanvasBounds) -> Vec<DrawingEvent> {
        self.events
            .into_iter()
            .filter_map(|value| serde_json::from_value::<RawDrawingEvent>(value).ok())
            .filter_map(|raw| raw.into_validated(bounds))
            .collect()
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

fn status_label(status: GameStatus) -> String {
    match status {
        GameStatus::Waiting => "waiting",
        GameStatus::Choosing => "choosing",
        GameStatus::Drawing => "drawing",
        GameStatus::Ended => "ended",
    }
    .to_string()
}

impl From<&Room> for RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            code: room.code.to_string(),
            status: status_label(room.game.status),
            player_count: room.players.len(),
            round: room.game.round,
            max_rounds: room.game.max_rounds,
            created_at: timestamp_to_jst_rfc3339(room.created_at),
        }
    }
}

fn player_summary(room: &Room, player: &Player) -> PlayerSummaryDto {
    PlayerSummaryDto {
        id: player.id.to_string(),
        name: player.name.to_string(),
        score: player.score,
        is_ready: player.is_ready,
        is_host: room.is_host(&player.id),
        is_drawer: room.is_drawer(&player.id),
    }
}

impl From<&Room> for RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            code: room.code.to_string(),
            host: room.host.to_string(),
            status: status_label(room.game.status),
            round: room.game.round,
            max_rounds: room.game.max_rounds,
            round_duration_ms: room.game.round_duration_ms,
            display_word: room.game.display_word.clone(),
            players: room
                .players
                .iter()
                .map(|player| player_summary(room, player))
                .collect(),
            drawing_events: room.drawing_history.len(),
            created_at: timestamp_to_jst_rfc3339(room.created_at),
            last_activity: timestamp_to_jst_rfc3339(room.last_activity),
        }
    }
}

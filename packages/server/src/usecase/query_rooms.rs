//! UseCase: 監視用の読み取り
//!
//! HTTP の管理 API から呼ばれる。ルームはロック中に複製して返す。

use std::sync::Arc;

use crate::domain::{MessagePusher, Room, RoomCode, RoomRepository};

use super::error::GetRoomDetailError;

/// ルーム一覧の取得
pub struct GetRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Vec<Room> {
        let mut rooms = Vec::new();
        for (_, shared) in self.repository.all_rooms().await {
            rooms.push(shared.lock().await.clone());
        }
        rooms
    }
}

/// ルーム詳細の取得
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, code: &str) -> Result<Room, GetRoomDetailError> {
        let code = RoomCode::parse(code).map_err(|_| GetRoomDetailError::RoomNotFound)?;
        let shared = self
            .repository
            .get_room(&code)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound)?;
        let room = shared.lock().await.clone();
        Ok(room)
    }
}

/// サーバー全体の集計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerStats {
    pub total_rooms: usize,
    pub total_players: usize,
    pub connections: usize,
}

pub struct GetStatsUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl GetStatsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    pub async fn execute(&self) -> ServerStats {
        ServerStats {
            total_rooms: self.repository.count_rooms().await,
            total_players: self.repository.count_bound_players().await,
            connections: self.message_pusher.connected_count().await,
        }
    }
}

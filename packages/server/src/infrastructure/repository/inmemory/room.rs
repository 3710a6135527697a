//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! コード → ルームと、接続ハンドル → コードの 2 つの HashMap を索引として持つ。
//!
//! 各索引のロックはメソッド内で完結させ、ルーム本体のロックとは入れ子にしない。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{PlayerId, RepositoryError, Room, RoomCode, RoomRepository, SharedRoom};

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    /// ルームコード → ルーム
    rooms: Mutex<HashMap<RoomCode, SharedRoom>>,
    /// 接続ハンドル → 所属ルームコード
    handles: Mutex<HashMap<PlayerId, RoomCode>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn insert_room(&self, room: Room) -> Result<SharedRoom, RepositoryError> {
        let code = room.code.clone();
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&code) {
            return Err(RepositoryError::DuplicateRoomCode(code.to_string()));
        }
        let shared = Arc::new(Mutex::new(room));
        rooms.insert(code, Arc::clone(&shared));
        Ok(shared)
    }

    async fn contains_code(&self, code: &RoomCode) -> bool {
        self.rooms.lock().await.contains_key(code)
    }

    async fn get_room(&self, code: &RoomCode) -> Option<SharedRoom> {
        self.rooms.lock().await.get(code).cloned()
    }

    async fn remove_room(&self, code: &RoomCode) -> Option<SharedRoom> {
        self.rooms.lock().await.remove(code)
    }

    async fn bind_player(&self, player: PlayerId, code: RoomCode) {
        self.handles.lock().await.insert(player, code);
    }

    async fn unbind_player(&self, player: &PlayerId) -> Option<RoomCode> {
        self.handles.lock().await.remove(player)
    }

    async fn room_code_of(&self, player: &PlayerId) -> Option<RoomCode> {
        self.handles.lock().await.get(player).cloned()
    }

    async fn all_rooms(&self) -> Vec<(RoomCode, SharedRoom)> {
        let rooms = self.rooms.lock().await;
        let mut all: Vec<_> = rooms
            .iter()
            .map(|(code, room)| (code.clone(), Arc::clone(room)))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    async fn count_rooms(&self) -> usize {
        self.rooms.lock().await.len()
    }

    async fn count_bound_players(&self) -> usize {
        self.handles.lock().await.len()
    }
}

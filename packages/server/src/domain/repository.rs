//! Repository trait 定義
//!
//! ルームの保管場所と、接続ハンドル → ルームコードの索引。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## ロックの順序
//!
//! 索引のロックを保持したまま個々のルームのロックを待たないこと。
//! Repository のメソッドは索引のロックをメソッド内で解放し、
//! ルームは `SharedRoom` として呼び出し側がロックする。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    entity::Room,
    error::RepositoryError,
    value_object::{PlayerId, RoomCode},
};

/// ルームごとのロック
pub type SharedRoom = Arc<Mutex<Room>>;

/// Room Repository trait
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームを登録する。コードが使用中なら `DuplicateRoomCode`
    async fn insert_room(&self, room: Room) -> Result<SharedRoom, RepositoryError>;

    async fn contains_code(&self, code: &RoomCode) -> bool;

    async fn get_room(&self, code: &RoomCode) -> Option<SharedRoom>;

    /// 索引からルームを外す（ハンドルの索引は呼び出し側が外す）
    async fn remove_room(&self, code: &RoomCode) -> Option<SharedRoom>;

    async fn bind_player(&self, player: PlayerId, code: RoomCode);

    async fn unbind_player(&self, player: &PlayerId) -> Option<RoomCode>;

    async fn room_code_of(&self, player: &PlayerId) -> Option<RoomCode>;

    /// 全ルーム（コード順）
    async fn all_rooms(&self) -> Vec<(RoomCode, SharedRoom)>;

    async fn count_rooms(&self) -> usize;

    async fn count_bound_players(&self) -> usize;

    /// ハンドルから所属ルームを引く
    async fn room_of(&self, player: &PlayerId) -> Option<(RoomCode, SharedRoom)> {
        let code = self.room_code_of(player).await?;
        let room = self.get_room(&code).await?;
        Some((code, room))
    }
}

//! UseCase: ルーム参加
//!
//! 参加できるのは待機中のルームだけ。参加者には現在の状態（参加者一覧・ゲーム状態・
//! 描画履歴）をまとめて返し、他の参加者には一覧の更新を流す。

use std::sync::Arc;

use doodlerush_shared::time::Clock;

use crate::{
    config::GameConfig,
    domain::{
        AvatarId, GameSnapshot, MembershipError, MessagePusher, Outbox, Player, PlayerId,
        PlayerName, RoomCode, RoomRepository, ServerEvent,
    },
};

use super::{dispatch::publish, error::JoinRoomError};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    config: Arc<GameConfig>,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        config: Arc<GameConfig>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
            config,
        }
    }

    pub async fn execute(
        &self,
        player_id: &PlayerId,
        code: &str,
        name: &str,
        avatar: Option<u32>,
    ) -> Result<RoomCode, JoinRoomError> {
        let name = PlayerName::new(name).map_err(JoinRoomError::InvalidName)?;
        let code = RoomCode::parse(code).map_err(JoinRoomError::InvalidCode)?;
        if self.repository.room_code_of(player_id).await.is_some() {
            return Err(JoinRoomError::AlreadyInRoom);
        }
        let shared = self
            .repository
            .get_room(&code)
            .await
            .ok_or_else(|| JoinRoomError::NotFound(code.to_string()))?;

        let outbox = {
            let mut room = shared.lock().await;
            let now = self.clock.now_millis();
            let player = Player::new(
                player_id.clone(),
                name.clone(),
                AvatarId(avatar.unwrap_or(1)),
                now,
            );
            room.admit(player, self.config.max_players)
                .map_err(|e| match e {
                    MembershipError::Full => JoinRoomError::Full,
                    MembershipError::AlreadyStarted => JoinRoomError::AlreadyStarted,
                    MembershipError::Closed => JoinRoomError::NotFound(code.to_string()),
                    MembershipError::AlreadyMember => JoinRoomError::AlreadyInRoom,
                })?;
            room.touch(now);
            // 削除と競合しないよう、ロックを持ったまま索引に登録する
            self.repository
                .bind_player(player_id.clone(), code.clone())
                .await;

            let mut outbox = Outbox::new();
            outbox.to(
                player_id,
                ServerEvent::RoomJoined {
                    room_code: code.clone(),
                    player_id: player_id.clone(),
                    is_host: room.is_host(player_id),
                    players: room.players.clone(),
                    game: GameSnapshot::from(&*room),
                    drawing_history: room.drawing_history.clone(),
                },
            );
            outbox.room(
                &room,
                ServerEvent::players_updated(&room, self.config.min_players, now),
            );
            outbox
        };
        publish(self.message_pusher.as_ref(), outbox).await;
        tracing::info!("Player '{}' joined room '{}'", name, code);
        Ok(code)
    }
}

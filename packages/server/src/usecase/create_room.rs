//! UseCase: ルーム作成
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//! - ルームコードの採番、作成者のホスト登録、通知
//!
//! ### どのような状況を想定しているか
//! - 正常系：新しいルームを作ってホストになる
//! - 異常系：不正な名前、すでにルームにいるプレイヤー
//! - エッジケース：コードの候補が 1 つしかなく、使い切っている

use std::sync::Arc;

use doodlerush_shared::time::Clock;

use crate::{
    config::GameConfig,
    domain::{
        AvatarId, MessagePusher, Outbox, Player, PlayerId, PlayerName, RepositoryError, Room,
        RoomCode, RoomCodeFactory, RoomRepository, ServerEvent,
    },
};

use super::{dispatch::publish, error::CreateRoomError};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    config: Arc<GameConfig>,
}

impl CreateRoomUseCase {
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

    /// ルームを作成し、作成者をホストとして登録する
    ///
    /// # Returns
    ///
    /// * `Ok(RoomCode)` - 採番されたルームコード
    /// * `Err(CreateRoomError)` - 作成失敗
    pub async fn execute(
        &self,
        owner: &PlayerId,
        name: &str,
        avatar: Option<u32>,
    ) -> Result<RoomCode, CreateRoomError> {
        let name = PlayerName::new(name).map_err(CreateRoomError::InvalidName)?;
        if self.repository.room_code_of(owner).await.is_some() {
            return Err(CreateRoomError::AlreadyInRoom);
        }

        let now = self.clock.now_millis();
        let avatar = AvatarId(avatar.unwrap_or(1));

        for _ in 0..self.config.room_code_attempts {
            let code = RoomCodeFactory::generate(
                &self.config.room_code_alphabet,
                self.config.room_code_length,
            )
            .map_err(CreateRoomError::CodeGeneration)?;
            if self.repository.contains_code(&code).await {
                continue;
            }

            let host = Player::new(owner.clone(), name.clone(), avatar, now);
            let room = Room::new(
                code.clone(),
                host,
                self.config.default_rounds,
                self.config.default_round_duration_ms,
                now,
            );
            let shared = match self.repository.insert_room(room).await {
                Ok(shared) => shared,
                Err(RepositoryError::DuplicateRoomCode(_)) => continue,
                Err(e) => return Err(e.into()),
            };

            let outbox = {
                let room = shared.lock().await;
                self.repository.bind_player(owner.clone(), code.clone()).await;
                let mut outbox = Outbox::new();
                outbox.to(
                    owner,
                    ServerEvent::RoomCreated {
                        room_code: code.clone(),
                        player_id: owner.clone(),
                        is_host: true,
                        players: room.players.clone(),
                    },
                );
                outbox.to(
                    owner,
                    ServerEvent::players_updated(&room, self.config.min_players, now),
                );
                outbox
            };
            publish(self.message_pusher.as_ref(), outbox).await;
            tracing::info!("Room '{}' created by '{}'", code, name);
            return Ok(code);
        }

        Err(CreateRoomError::CodeExhausted {
            attempts: self.config.room_code_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{Harness, id};

    #[tokio::test]
    async fn test_create_room_makes_owner_host() {
        // テスト項目: 作成者がホストとしてルームに入り、room.created が届く
        // given (前提条件):
        let harness = Harness::new();

        // when (操作):
        let code = harness
            .create_room
            .execute(&id("alice"), "Alice", Some(3))
            .await
            .unwrap();

        // then (期待する結果):
        let room = harness.room(&code).await;
        assert_eq!(room.host, id("alice"));
        assert_eq!(room.players[0].avatar, AvatarId(3));
        assert_eq!(code.as_str().len(), 4);
        assert_eq!(harness.repository.room_code_of(&id("alice")).await, Some(code));
        assert!(harness.pusher.find(&id("alice"), |event| {
            matches!(event, ServerEvent::RoomCreated { is_host: true, .. })
        })
        .is_some());
    }

    #[tokio::test]
    async fn test_create_room_rejects_invalid_name() {
        // テスト項目: 空の名前ではルームを作れない
        // given (前提条件):
        let harness = Harness::new();

        // when (操作):
        let result = harness.create_room.execute(&id("alice"), "   ", None).await;

        // then (期待する結果):
        assert!(matches!(result, Err(CreateRoomError::InvalidName(_))));
        assert_eq!(harness.repository.count_rooms().await, 0);
    }

    #[tokio::test]
    async fn test_create_room_rejects_player_already_in_room() {
        // テスト項目: すでにルームにいるプレイヤーは新しいルームを作れない
        // given (前提条件):
        let harness = Harness::new();
        harness.room_with(&["alice"]).await;

        // when (操作):
        let result = harness.create_room.execute(&id("alice"), "alice", None).await;

        // then (期待する結果):
        assert!(matches!(result, Err(CreateRoomError::AlreadyInRoom)));
    }

    #[tokio::test]
    async fn test_create_room_reports_exhausted_codes() {
        // テスト項目: 空いているコードが見つからなければ CodeExhausted
        // given (前提条件):
        let harness = Harness::with_config(GameConfig {
            room_code_alphabet: "A".to_string(),
            room_code_length: 4,
            room_code_attempts: 5,
            ..GameConfig::default()
        });
        harness.create_room.execute(&id("alice"), "alice", None).await.unwrap();

        // when (操作):
        let result = harness.create_room.execute(&id("bob"), "bob", None).await;

        // then (期待する結果):
        assert!(matches!(result, Err(CreateRoomError::CodeExhausted { attempts: 5 })));
    }
}

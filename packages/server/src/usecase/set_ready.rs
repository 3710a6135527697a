//! UseCase: 準備完了の切り替え

use std::sync::Arc;

use doodlerush_shared::time::Clock;

use crate::domain::{MessagePusher, Outbox, PlayerId, RoomRepository, ServerEvent};

use super::{dispatch::publish, error::GameCommandError};

pub struct SetReadyUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    min_players: usize,
}

impl SetReadyUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        min_players: usize,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
            min_players,
        }
    }

    pub async fn execute(&self, player: &PlayerId, is_ready: bool) -> Result<(), GameCommandError> {
        let (_, shared) = self
            .repository
            .room_of(player)
            .await
            .ok_or(GameCommandError::NotInRoom)?;
        let outbox = {
            let mut room = shared.lock().await;
            if room.closed {
                return Err(GameCommandError::NotInRoom);
            }
            let now = self.clock.now_millis();
            room.touch(now);
            room.player_mut(player)
                .ok_or(GameCommandError::NotInRoom)?
                .is_ready = is_ready;

            let mut outbox = Outbox::new();
            outbox.room(&room, ServerEvent::players_updated(&room, self.min_players, now));
            outbox
        };
        publish(self.message_pusher.as_ref(), outbox).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{Harness, id};

    #[tokio::test]
    async fn test_all_ready_requires_min_players() {
        // テスト項目: 全員が準備完了でも最低人数に届かなければ allReady は false
        // given (前提条件):
        let harness = Harness::new();
        harness.room_with(&["host"]).await;

        // when (操作):
        harness.set_ready.execute(&id("host"), true).await.unwrap();

        // then (期待する結果):
        let update = harness.pusher.last(&id("host"));
        assert!(matches!(
            update,
            Some(ServerEvent::PlayersUpdated { all_ready: false, .. })
        ));
    }

    #[tokio::test]
    async fn test_all_ready_when_everyone_is_ready() {
        // テスト項目: 2 人以上が全員準備完了なら allReady は true
        // given (前提条件):
        let harness = Harness::new();
        let code = harness.room_with(&["host", "alice"]).await;
        harness.set_ready.execute(&id("host"), true).await.unwrap();

        // when (操作):
        harness.set_ready.execute(&id("alice"), true).await.unwrap();

        // then (期待する結果):
        assert!(harness.room(&code).await.players.iter().all(|p| p.is_ready));
        assert!(matches!(
            harness.pusher.last(&id("host")),
            Some(ServerEvent::PlayersUpdated { all_ready: true, .. })
        ));
    }
}

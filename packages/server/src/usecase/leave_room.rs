//! UseCase: ルーム退出（明示的な退出と切断の両方）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() メソッド
//! - ホストの引き継ぎ、空になったルームの削除、ゲーム進行中の退出
//!
//! ### どのような状況を想定しているか
//! - 正常系：待機中に退出する
//! - ゲーム中：描き手が抜ける、最後の未正解者が抜ける、最低人数を割る
//! - エッジケース：どのルームにもいないプレイヤー

use std::sync::Arc;

use doodlerush_shared::time::Clock;

use crate::domain::{MessagePusher, Outbox, PlayerId, RoomCode, RoomRepository, ServerEvent};

use super::{dispatch::publish, round_orchestrator::RoundOrchestrator};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    orchestrator: Arc<RoundOrchestrator>,
    clock: Arc<dyn Clock>,
    min_players: usize,
}

impl LeaveRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        orchestrator: Arc<RoundOrchestrator>,
        clock: Arc<dyn Clock>,
        min_players: usize,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            orchestrator,
            clock,
            min_players,
        }
    }

    /// プレイヤーをルームから外す
    ///
    /// # Returns
    ///
    /// * `Some(RoomCode)` - 退出したルーム
    /// * `None` - どのルームにもいなかった
    pub async fn execute(&self, player: &PlayerId) -> Option<RoomCode> {
        let code = self.repository.unbind_player(player).await?;
        let shared = self.repository.get_room(&code).await?;

        let (outbox, now_empty) = {
            let mut room = shared.lock().await;
            if room.closed {
                return None;
            }
            let was_drawer = room.is_drawer(player);
            room.remove_player(player)?;
            let now = self.clock.now_millis();
            room.touch(now);

            let mut outbox = Outbox::new();
            outbox.to(
                player,
                ServerEvent::RoomLeft {
                    room_code: code.clone(),
                },
            );
            let now_empty = room.is_empty();
            if now_empty {
                room.closed = true;
            } else {
                outbox.room(&room, ServerEvent::players_updated(&room, self.min_players, now));
                outbox.append(
                    self.orchestrator
                        .handle_departure(&mut room, player, was_drawer),
                );
            }
            (outbox, now_empty)
        };

        if now_empty {
            self.orchestrator.close_room(&code, "empty").await;
        }
        publish(self.message_pusher.as_ref(), outbox).await;
        tracing::info!("Player '{}' left room '{}'", player, code);
        Some(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{GameStatus, TimerScheduler},
        usecase::test_support::{Harness, id},
    };

    #[tokio::test]
    async fn test_leave_room_promotes_next_host() {
        // テスト項目: ホストが抜けると参加順で次のプレイヤーがホストになる
        // given (前提条件):
        let harness = Harness::new();
        let code = harness.room_with(&["host", "alice", "bob"]).await;

        // when (操作):
        let left = harness.leave_room.execute(&id("host")).await;

        // then (期待する結果):
        assert_eq!(left, Some(code.clone()));
        let room = harness.room(&code).await;
        assert_eq!(room.host, id("alice"));
        assert!(harness.pusher.find(&id("host"), |event| {
            matches!(event, ServerEvent::RoomLeft { .. })
        })
        .is_some());
        assert!(harness.pusher.find(&id("bob"), |event| {
            matches!(event, ServerEvent::PlayersUpdated { host, .. } if *host == id("alice"))
        })
        .is_some());
    }

    #[tokio::test]
    async fn test_last_player_leaving_deletes_room() {
        // テスト項目: 最後の 1 人が抜けるとルームが削除される
        // given (前提条件):
        let harness = Harness::new();
        let code = harness.room_with(&["host"]).await;

        // when (操作):
        harness.leave_room.execute(&id("host")).await;

        // then (期待する結果):
        assert!(harness.repository.get_room(&code).await.is_none());
        assert_eq!(harness.repository.count_bound_players().await, 0);
    }

    #[tokio::test]
    async fn test_leave_without_room_is_noop() {
        // テスト項目: ルームにいないプレイヤーの退出は何もしない
        // given (前提条件):
        let harness = Harness::new();

        // when (操作):
        let left = harness.leave_room.execute(&id("ghost")).await;

        // then (期待する結果):
        assert_eq!(left, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drawer_leaving_ends_round() {
        // テスト項目: 描画中に描き手が抜けるとラウンドが終わり、次の描き手に回る
        // given (前提条件):
        let harness = Harness::new();
        let code = harness.room_with(&["host", "alice", "bob"]).await;
        harness.orchestrator.start_game(&id("host"), Some(3), None).await.unwrap();
        let word = harness.room(&code).await.game.word_options[0].word.clone();
        harness.orchestrator.select_word(&id("host"), &word).await.unwrap();

        // when (操作):
        harness.leave_room.execute(&id("host")).await;

        // then (期待する結果):
        let room = harness.room(&code).await;
        assert_eq!(room.game.status, GameStatus::Choosing);
        assert_eq!(room.game.round, 2);
        assert!(harness.pusher.find(&id("alice"), |event| {
            matches!(event, ServerEvent::RoundEnded { word: w, .. } if *w == word)
        })
        .is_some());

        harness.advance(5_000).await;
        assert_eq!(harness.room(&code).await.game.current_drawer, Some(id("alice")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_unguessed_player_leaving_ends_round_without_bonus() {
        // テスト項目: 未正解の回答者が全員抜けたらラウンドが終わるが Perfect Round は付かない
        // given (前提条件):
        let harness = Harness::new();
        let code = harness.room_with(&["host", "alice", "bob"]).await;
        harness.orchestrator.start_game(&id("host"), Some(3), None).await.unwrap();
        let word = harness.room(&code).await.game.word_options[0].word.clone();
        harness.orchestrator.select_word(&id("host"), &word).await.unwrap();
        harness.orchestrator.handle_chat(&id("alice"), &word).await.unwrap();
        let alice_score = harness.room(&code).await.player(&id("alice")).unwrap().score;

        // when (操作):
        harness.leave_room.execute(&id("bob")).await;

        // then (期待する結果):
        let room = harness.room(&code).await;
        assert_eq!(room.game.status, GameStatus::Choosing);
        assert_eq!(room.player(&id("alice")).unwrap().score, alice_score);
    }

    #[tokio::test(start_paused = true)]
    async fn test_falling_below_min_players_ends_game() {
        // テスト項目: ゲーム中に最低人数を割るとゲームが終わる
        // given (前提条件):
        let harness = Harness::new();
        let code = harness.room_with(&["host", "alice"]).await;
        harness.orchestrator.start_game(&id("host"), None, None).await.unwrap();

        // when (操作):
        harness.leave_room.execute(&id("alice")).await;

        // then (期待する結果):
        let room = harness.room(&code).await;
        assert_eq!(room.game.status, GameStatus::Ended);
        assert_eq!(harness.scheduler.pending(&code), 0);
        assert!(harness.pusher.find(&id("host"), |event| {
            matches!(event, ServerEvent::GameEnded { .. })
        })
        .is_some());
    }
}

//! UseCase: パワーアップ（見積もり・購入・発動）
//!
//! 価格と効果の計算は `domain::economy` が行い、ここではロックと通知、
//! 発動に伴うタイマー（締切の延長・時限効果の解除）の登録を受け持つ。

use std::sync::Arc;

use doodlerush_shared::time::Clock;
use rand::thread_rng;

use crate::{
    config::GameConfig,
    domain::{
        MessagePusher, Outbox, PlayerId, PowerupError, PowerupKind, Room, RoomRepository,
        ServerEvent, SharedRoom, TargetRejection,
        economy::{self, Activation},
        pricing,
    },
};

use super::{
    dispatch::publish, error::PowerupCommandError, round_orchestrator::RoundOrchestrator,
};

/// パワーアップ操作のユースケース
pub struct PowerupUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    orchestrator: Arc<RoundOrchestrator>,
    clock: Arc<dyn Clock>,
    config: Arc<GameConfig>,
}

fn parse_target(target: Option<&str>) -> Result<Option<PlayerId>, PowerupCommandError> {
    target
        .map(|raw| {
            PlayerId::new(raw).map_err(|_| {
                PowerupCommandError::from(PowerupError::InvalidTarget(TargetRejection::NotMember))
            })
        })
        .transpose()
}

fn activate_now(
    room: &mut Room,
    activator: &PlayerId,
    kind: PowerupKind,
    target: Option<&PlayerId>,
    now: i64,
) -> Result<Activation, PowerupError> {
    economy::activate(room, activator, kind, target, now, &mut thread_rng())
}

impl PowerupUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        orchestrator: Arc<RoundOrchestrator>,
        clock: Arc<dyn Clock>,
        config: Arc<GameConfig>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            orchestrator,
            clock,
            config,
        }
    }

    async fn locate(&self, player: &PlayerId) -> Result<SharedRoom, PowerupCommandError> {
        self.repository
            .room_of(player)
            .await
            .map(|(_, shared)| shared)
            .ok_or(PowerupCommandError::NotInRoom)
    }

    /// 現在の価格を見積もって本人に返す
    pub async fn get_price(
        &self,
        buyer: &PlayerId,
        kind: PowerupKind,
        target: Option<&str>,
    ) -> Result<i64, PowerupCommandError> {
        let target = parse_target(target)?;
        let shared = self.locate(buyer).await?;
        let price = {
            let room = shared.lock().await;
            if room.closed {
                return Err(PowerupCommandError::NotInRoom);
            }
            pricing::quote(&room, buyer, kind, target.as_ref(), self.clock.now_millis())?
        };
        let notice = ServerEvent::PowerupPriceUpdate {
            powerup_id: kind,
            price,
            target,
        };
        if let Err(e) = self.message_pusher.push_to(buyer, &notice).await {
            tracing::warn!("Failed to deliver price to '{}': {}", buyer, e);
        }
        Ok(price)
    }

    /// 購入する（スコアから差し引いて在庫に加える）
    pub async fn purchase(
        &self,
        buyer: &PlayerId,
        kind: PowerupKind,
        target: Option<&str>,
    ) -> Result<i64, PowerupCommandError> {
        let target = parse_target(target)?;
        let shared = self.locate(buyer).await?;
        let (outbox, price) = {
            let mut room = shared.lock().await;
            if room.closed {
                return Err(PowerupCommandError::NotInRoom);
            }
            let now = self.clock.now_millis();
            room.touch(now);
            let bought = economy::purchase(&mut room, buyer, kind, target.as_ref(), now)?;

            let mut outbox = Outbox::new();
            outbox.to(
                buyer,
                ServerEvent::PowerupPurchased {
                    powerup_id: kind,
                    price: bought.price,
                    score: bought.score,
                    powerups: bought.powerups,
                },
            );
            outbox.room(
                &room,
                ServerEvent::players_updated(&room, self.config.min_players, now),
            );
            tracing::info!(
                "Player '{}' bought {} for {} in room '{}'",
                buyer,
                kind,
                bought.price,
                room.code
            );
            (outbox, bought.price)
        };
        publish(self.message_pusher.as_ref(), outbox).await;
        Ok(price)
    }

    /// 発動する
    pub async fn activate(
        &self,
        activator: &PlayerId,
        kind: PowerupKind,
        target: Option<&str>,
    ) -> Result<(), PowerupCommandError> {
        let target = parse_target(target)?;
        let shared = self.locate(activator).await?;
        let outbox = {
            let mut room = shared.lock().await;
            if room.closed {
                return Err(PowerupCommandError::NotInRoom);
            }
            let now = self.clock.now_millis();
            room.touch(now);
            let Activation {
                mut outbox,
                effect_timers,
                new_deadline,
                scores_changed,
            } = activate_now(&mut room, activator, kind, target.as_ref(), now)?;

            if let Some(deadline) = new_deadline {
                self.orchestrator.extend_round(&room, deadline, now);
            }
            for timer in effect_timers {
                self.orchestrator.schedule_effect_clear(&room, timer);
            }
            if scores_changed {
                outbox.room(
                    &room,
                    ServerEvent::players_updated(&room, self.config.min_players, now),
                );
            }
            tracing::info!(
                "Player '{}' activated {} in room '{}'",
                activator,
                kind,
                room.code
            );
            outbox
        };
        publish(self.message_pusher.as_ref(), outbox).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{EffectNotice, GameStatus},
        usecase::{
            error::{CommandError, ErrorClass},
            test_support::{Harness, id},
        },
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 購入時のスコア不足、購入後の在庫とスコア
    // - 役割違反が Authorization に分類されること
    // - 締切の延長がラウンド終了タイマーに反映されること
    // - 時限効果が時間経過で解除されること
    // ========================================

    async fn drawing_room(harness: &Harness) -> String {
        let code = harness.room_with(&["host", "alice", "bob"]).await;
        harness.orchestrator.start_game(&id("host"), Some(3), None).await.unwrap();
        let word = harness.room(&code).await.game.word_options[0].word.clone();
        harness.orchestrator.select_word(&id("host"), &word).await.unwrap();
        word
    }

    async fn fund(harness: &Harness, player: &str, score: i64) {
        let code = harness.repository.room_code_of(&id(player)).await.unwrap();
        harness
            .with_room(&code, |room| {
                room.player_mut(&id(player)).unwrap().score = score;
            })
            .await;
    }

    #[tokio::test]
    async fn test_purchase_rejects_insufficient_funds() {
        // テスト項目: スコアが価格に届かなければ購入できない
        // given (前提条件):
        let harness = Harness::new();
        harness.room_with(&["host", "alice"]).await;

        // when (操作):
        let result = harness
            .powerup
            .purchase(&id("alice"), PowerupKind::RevealLetter, None)
            .await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(PowerupCommandError::Rejected(PowerupError::InsufficientFunds { .. }))
        ));
        assert!(harness.pusher.find(&id("alice"), |event| {
            matches!(event, ServerEvent::PowerupPurchased { .. })
        })
        .is_none());
    }

    #[tokio::test]
    async fn test_purchase_debits_score_and_adds_inventory() {
        // テスト項目: 購入すると見積もりと同じ価格が差し引かれ、在庫が 1 増える
        // given (前提条件):
        let harness = Harness::new();
        let code = harness.room_with(&["host", "alice"]).await;
        fund(&harness, "alice", 5_000).await;
        let quoted = harness
            .powerup
            .get_price(&id("alice"), PowerupKind::WordLength, None)
            .await
            .unwrap();

        // when (操作):
        let price = harness
            .powerup
            .purchase(&id("alice"), PowerupKind::WordLength, None)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(price, quoted);
        let room = harness.room(&code).await;
        let alice = room.player(&id("alice")).unwrap();
        assert_eq!(alice.score, 5_000 - price);
        assert!(alice.owns(PowerupKind::WordLength));
        assert!(harness.pusher.find(&id("alice"), |event| {
            matches!(event, ServerEvent::PowerupPriceUpdate { price: p, .. } if *p == quoted)
        })
        .is_some());
    }

    #[tokio::test]
    async fn test_quote_rejects_unknown_target() {
        // テスト項目: ルームにいない相手を指定した見積もりは拒否される
        // given (前提条件):
        let harness = Harness::new();
        harness.room_with(&["host", "alice"]).await;

        // when (操作):
        let result = harness
            .powerup
            .get_price(&id("alice"), PowerupKind::PointSteal, Some("nobody"))
            .await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(PowerupCommandError::Rejected(PowerupError::InvalidTarget(
                TargetRejection::NotMember
            )))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_role_is_authorization_error() {
        // テスト項目: 回答者が描き手用のパワーアップを使うと Authorization に分類される
        // given (前提条件):
        let harness = Harness::new();
        drawing_room(&harness).await;
        let code = harness.repository.room_code_of(&id("alice")).await.unwrap();
        harness
            .with_room(&code, |room| {
                room.player_mut(&id("alice")).unwrap().grant(PowerupKind::ExtraTime);
            })
            .await;

        // when (操作):
        let result = harness
            .powerup
            .activate(&id("alice"), PowerupKind::ExtraTime, None)
            .await;

        // then (期待する結果):
        let error = result.unwrap_err();
        assert_eq!(error.class(), ErrorClass::Authorization);
        assert!(harness.room(&code).await.player(&id("alice")).unwrap().owns(PowerupKind::ExtraTime));
    }

    #[tokio::test(start_paused = true)]
    async fn test_extra_time_moves_round_end() {
        // テスト項目: Extra Time で締切が 30 秒延び、元の締切ではラウンドが終わらない
        // given (前提条件):
        let harness = Harness::new();
        drawing_room(&harness).await;
        let code = harness.repository.room_code_of(&id("host")).await.unwrap();
        harness
            .with_room(&code, |room| {
                room.player_mut(&id("host")).unwrap().grant(PowerupKind::ExtraTime);
            })
            .await;

        // when (操作):
        harness
            .powerup
            .activate(&id("host"), PowerupKind::ExtraTime, None)
            .await
            .unwrap();

        // then (期待する結果):
        let room = harness.room(&code).await;
        assert_eq!(room.game.round_deadline, Some(110_000));
        harness.advance(80_000).await;
        assert_eq!(harness.room(&code).await.game.status, GameStatus::Drawing);
        harness.advance(30_000).await;
        assert_eq!(harness.room(&code).await.game.round, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_brush_sabotage_expires_after_duration() {
        // テスト項目: Brush Sabotage は 15 秒後に自動で解除され、全員に終了が通知される
        // given (前提条件):
        let harness = Harness::new();
        drawing_room(&harness).await;
        let code = harness.repository.room_code_of(&id("alice")).await.unwrap();
        harness
            .with_room(&code, |room| {
                room.player_mut(&id("alice")).unwrap().grant(PowerupKind::BrushSabotage);
            })
            .await;

        // when (操作):
        harness
            .powerup
            .activate(&id("alice"), PowerupKind::BrushSabotage, None)
            .await
            .unwrap();
        assert!(harness.room(&code).await.game.brush_sabotage_active);
        harness.advance(15_000).await;

        // then (期待する結果):
        assert!(!harness.room(&code).await.game.brush_sabotage_active);
        assert!(harness.pusher.find(&id("host"), |event| {
            matches!(event, ServerEvent::PowerupEffect(EffectNotice::BrushSabotageEnded))
        })
        .is_some());
    }
}

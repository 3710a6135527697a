//! UseCase: 放置されたルームの掃除
//!
//! 最終操作から TTL を過ぎたルームを閉じる。UI 層が一定間隔で呼ぶ。

use std::sync::Arc;

use doodlerush_shared::time::Clock;

use crate::domain::RoomRepository;

use super::round_orchestrator::RoundOrchestrator;

pub struct SweepRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
    orchestrator: Arc<RoundOrchestrator>,
    clock: Arc<dyn Clock>,
    inactivity_ttl_ms: i64,
}

impl SweepRoomsUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        orchestrator: Arc<RoundOrchestrator>,
        clock: Arc<dyn Clock>,
        inactivity_ttl_ms: i64,
    ) -> Self {
        Self {
            repository,
            orchestrator,
            clock,
            inactivity_ttl_ms,
        }
    }

    /// 閉じたルームの数を返す
    pub async fn execute(&self) -> usize {
        let now = self.clock.now_millis();
        let mut stale = Vec::new();
        for (code, shared) in self.repository.all_rooms().await {
            let room = shared.lock().await;
            if now - room.last_activity > self.inactivity_ttl_ms {
                stale.push(code);
            }
        }

        for code in &stale {
            self.orchestrator.close_room(code, "inactive").await;
        }
        if !stale.is_empty() {
            tracing::info!("Swept {} inactive room(s)", stale.len());
        }
        stale.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::{RoomRepository, ServerEvent},
        usecase::test_support::{Harness, id},
    };

    #[tokio::test]
    async fn test_sweep_closes_only_inactive_rooms() {
        // テスト項目: TTL（1 時間）を過ぎたルームだけが閉じられる
        // given (前提条件):
        let harness = Harness::new();
        let old = harness.room_with(&["old"]).await;
        harness.clock.advance(3_000_000);
        let fresh = harness.room_with(&["fresh"]).await;
        harness.clock.advance(600_001);

        // when (操作):
        let swept = harness.sweep_rooms.execute().await;

        // then (期待する結果):
        assert_eq!(swept, 1);
        assert!(harness.repository.get_room(&old).await.is_none());
        assert!(harness.repository.get_room(&fresh).await.is_some());
        assert!(harness.pusher.find(&id("old"), |event| {
            matches!(event, ServerEvent::RoomClosed { reason, .. } if reason == "inactive")
        })
        .is_some());
    }

    #[tokio::test]
    async fn test_activity_keeps_room_alive() {
        // テスト項目: 操作があったルームは TTL がリセットされる
        // given (前提条件):
        let harness = Harness::new();
        let code = harness.room_with(&["host"]).await;
        harness.clock.advance(3_500_000);
        harness.set_ready.execute(&id("host"), true).await.unwrap();
        harness.clock.advance(3_500_000);

        // when (操作):
        let swept = harness.sweep_rooms.execute().await;

        // then (期待する結果):
        assert_eq!(swept, 0);
        assert!(harness.repository.get_room(&code).await.is_some());
    }
}

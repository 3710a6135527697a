//! UseCase テスト用の組み立て
//!
//! インメモリのリポジトリ、tokio のタイマー、手動の時計、送信内容を記録する Pusher で
//! すべてのユースケースを組み立てる。

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use doodlerush_shared::time::ManualClock;

use crate::{
    config::GameConfig,
    domain::{
        MessagePushError, MessagePusher, PlayerId, PusherChannel, Room, RoomCode, RoomRepository,
        ServerEvent,
    },
    infrastructure::{repository::InMemoryRoomRepository, timer::TokioTimerScheduler},
};

use super::{
    CreateRoomUseCase, DrawingUseCase, JoinRoomUseCase, LeaveRoomUseCase, PowerupUseCase,
    RoundOrchestrator, SetReadyUseCase, SweepRoomsUseCase,
};

pub(crate) fn id(name: &str) -> PlayerId {
    PlayerId::new(name).unwrap()
}

/// 送った通知をプレイヤーごとに記録する
#[derive(Default)]
pub(crate) struct RecordingPusher {
    delivered: Mutex<Vec<(PlayerId, ServerEvent)>>,
}

impl RecordingPusher {
    pub(crate) fn received(&self, player: &PlayerId) -> Vec<ServerEvent> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|(target, _)| target == player)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub(crate) fn find(
        &self,
        player: &PlayerId,
        predicate: impl Fn(&ServerEvent) -> bool,
    ) -> Option<ServerEvent> {
        self.received(player).into_iter().find(|event| predicate(event))
    }

    pub(crate) fn last(&self, player: &PlayerId) -> Option<ServerEvent> {
        self.received(player).pop()
    }

    pub(crate) fn clear(&self) {
        self.delivered.lock().unwrap().clear();
    }
}

#[async_trait]
impl MessagePusher for RecordingPusher {
    async fn register_client(&self, _client_id: PlayerId, _sender: PusherChannel) {}

    async fn unregister_client(&self, _client_id: &PlayerId) {}

    async fn push_to(
        &self,
        client_id: &PlayerId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        self.delivered
            .lock()
            .unwrap()
            .push((client_id.clone(), event.clone()));
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<PlayerId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let mut delivered = self.delivered.lock().unwrap();
        for target in targets {
            delivered.push((target, event.clone()));
        }
        Ok(())
    }

    async fn connected_count(&self) -> usize {
        0
    }
}

pub(crate) struct Harness {
    pub repository: Arc<InMemoryRoomRepository>,
    pub pusher: Arc<RecordingPusher>,
    pub scheduler: Arc<TokioTimerScheduler>,
    pub clock: Arc<ManualClock>,
    pub orchestrator: Arc<RoundOrchestrator>,
    pub create_room: CreateRoomUseCase,
    pub join_room: JoinRoomUseCase,
    pub leave_room: LeaveRoomUseCase,
    pub set_ready: SetReadyUseCase,
    pub powerup: PowerupUseCase,
    pub drawing: DrawingUseCase,
    pub sweep_rooms: SweepRoomsUseCase,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub(crate) fn with_config(config: GameConfig) -> Self {
        let config = Arc::new(config);
        let repository = Arc::new(InMemoryRoomRepository::new());
        let pusher = Arc::new(RecordingPusher::default());
        let scheduler = Arc::new(TokioTimerScheduler::new());
        let clock = Arc::new(ManualClock::new(0));

        let orchestrator = Arc::new(RoundOrchestrator::new(
            repository.clone(),
            pusher.clone(),
            scheduler.clone(),
            clock.clone(),
            config.clone(),
        ));
        Self {
            create_room: CreateRoomUseCase::new(
                repository.clone(),
                pusher.clone(),
                clock.clone(),
                config.clone(),
            ),
            join_room: JoinRoomUseCase::new(
                repository.clone(),
                pusher.clone(),
                clock.clone(),
                config.clone(),
            ),
            leave_room: LeaveRoomUseCase::new(
                repository.clone(),
                pusher.clone(),
                orchestrator.clone(),
                clock.clone(),
                config.min_players,
            ),
            set_ready: SetReadyUseCase::new(
                repository.clone(),
                pusher.clone(),
                clock.clone(),
                config.min_players,
            ),
            powerup: PowerupUseCase::new(
                repository.clone(),
                pusher.clone(),
                orchestrator.clone(),
                clock.clone(),
                config.clone(),
            ),
            drawing: DrawingUseCase::new(
                repository.clone(),
                pusher.clone(),
                clock.clone(),
                config.clone(),
            ),
            sweep_rooms: SweepRoomsUseCase::new(
                repository.clone(),
                orchestrator.clone(),
                clock.clone(),
                config.room_inactivity_ttl_ms,
            ),
            repository,
            pusher,
            scheduler,
            clock,
            orchestrator,
        }
    }

    /// 先頭の名前でルームを作り、残りを参加させる（ID は名前と同じ）
    pub(crate) async fn room_with(&self, names: &[&str]) -> RoomCode {
        let code = self
            .create_room
            .execute(&id(names[0]), names[0], None)
            .await
            .unwrap();
        for name in &names[1..] {
            self.join_room
                .execute(&id(name), code.as_str(), name, None)
                .await
                .unwrap();
        }
        code
    }

    /// ルームの現在の状態（複製）
    pub(crate) async fn room(&self, code: &RoomCode) -> Room {
        let shared = self.repository.get_room(code).await.unwrap();
        let room = shared.lock().await.clone();
        room
    }

    pub(crate) async fn with_room(&self, code: &RoomCode, edit: impl FnOnce(&mut Room)) {
        let shared = self.repository.get_room(code).await.unwrap();
        let mut room = shared.lock().await;
        edit(&mut room);
    }

    /// ゲーム内の時計と tokio の時間を 1 秒刻みで進める（start_paused 前提）
    pub(crate) async fn advance(&self, millis: u64) {
        let mut remaining = millis;
        while remaining > 0 {
            let step = remaining.min(1_000);
            self.clock.advance(step as i64);
            tokio::time::advance(Duration::from_millis(step)).await;
            settle().await;
            remaining -= step;
        }
    }
}

async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

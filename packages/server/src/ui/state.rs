//! Server state and dependency wiring.

use std::sync::Arc;

use doodlerush_shared::time::Clock;

use crate::{
    config::GameConfig,
    domain::{MessagePusher, RoomRepository, TimerScheduler},
    infrastructure::{repository::InMemoryRoomRepository, timer::TokioTimerScheduler},
    usecase::{
        CreateRoomUseCase, DrawingUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        GetStatsUseCase, JoinRoomUseCase, LeaveRoomUseCase, PowerupUseCase, RoundOrchestrator,
        SetReadyUseCase, SweepRoomsUseCase,
    },
};

/// Shared application state
pub struct AppState {
    pub config: Arc<GameConfig>,
    /// MessagePusher（接続の登録・解除に使う）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// RoundOrchestrator（ゲーム進行）
    pub orchestrator: Arc<RoundOrchestrator>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub set_ready_usecase: Arc<SetReadyUseCase>,
    pub powerup_usecase: Arc<PowerupUseCase>,
    pub drawing_usecase: Arc<DrawingUseCase>,
    pub sweep_rooms_usecase: Arc<SweepRoomsUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    pub get_stats_usecase: Arc<GetStatsUseCase>,
}

impl AppState {
    /// Wire every use case on top of the given infrastructure.
    pub fn new(
        config: GameConfig,
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        scheduler: Arc<dyn TimerScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let config = Arc::new(config);
        let orchestrator = Arc::new(RoundOrchestrator::new(
            repository.clone(),
            message_pusher.clone(),
            scheduler,
            clock.clone(),
            config.clone(),
        ));

        Self {
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
                config.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
                config.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                orchestrator.clone(),
                clock.clone(),
                config.min_players,
            )),
            set_ready_usecase: Arc::new(SetReadyUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
                config.min_players,
            )),
            powerup_usecase: Arc::new(PowerupUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                orchestrator.clone(),
                clock.clone(),
                config.clone(),
            )),
            drawing_usecase: Arc::new(DrawingUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
                config.clone(),
            )),
            sweep_rooms_usecase: Arc::new(SweepRoomsUseCase::new(
                repository.clone(),
                orchestrator.clone(),
                clock,
                config.room_inactivity_ttl_ms,
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository.clone())),
            get_stats_usecase: Arc::new(GetStatsUseCase::new(repository, message_pusher.clone())),
            config,
            message_pusher,
            orchestrator,
        }
    }

    /// In-memory repository and tokio timers.
    pub fn in_memory(
        config: GameConfig,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryRoomRepository::new()),
            message_pusher,
            Arc::new(TokioTimerScheduler::new()),
            clock,
        )
    }
}

//! UseCase layer
//!
//! クライアントのコマンド 1 つにつき 1 つの操作。ルームのロックを取り、
//! ドメインの規則で状態を変え、ロックを外してから通知を配信する。

mod dispatch;
pub mod create_room;
pub mod drawing;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod powerup;
pub mod query_rooms;
pub mod round_orchestrator;
pub mod set_ready;
pub mod sweep_rooms;

#[cfg(test)]
pub(crate) mod test_support;

pub use create_room::CreateRoomUseCase;
pub use drawing::DrawingUseCase;
pub use error::{
    CommandError, CreateRoomError, ErrorClass, GameCommandError, GetRoomDetailError,
    JoinRoomError, PowerupCommandError,
};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use powerup::PowerupUseCase;
pub use query_rooms::{GetRoomDetailUseCase, GetRoomsUseCase, GetStatsUseCase, ServerStats};
pub use round_orchestrator::RoundOrchestrator;
pub use set_ready::SetReadyUseCase;
pub use sweep_rooms::SweepRoomsUseCase;

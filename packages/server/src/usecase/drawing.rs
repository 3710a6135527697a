//! UseCase: 描画の中継
//!
//! 描き手のストロークを他の参加者へ流し、途中参加者向けの履歴に積む。
//! 座標と種別の検証は受信時（DTO 変換）に済ませてある。

use std::sync::Arc;

use doodlerush_shared::time::Clock;
use rand::Rng;

use crate::{
    config::GameConfig,
    domain::{
        DrawingEvent, GameStatus, MessagePusher, Outbox, PlayerId, RoomRepository, ServerEvent,
        drawing::append_history,
    },
};

use super::{dispatch::publish, error::GameCommandError};

pub struct DrawingUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    config: Arc<GameConfig>,
}

/// Brush Sabotage 中はブラシサイズをランダムに差し替える
fn sabotage_sizes(events: &mut [DrawingEvent], max_brush_size: u32) {
    let mut rng = rand::thread_rng();
    for event in events {
        event.size = Some(rng.gen_range(1..=max_brush_size.max(1)));
    }
}

impl DrawingUseCase {
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

    /// ストロークのまとまりを中継する（描き手・描画中のみ）
    pub async fn relay_batch(
        &self,
        drawer: &PlayerId,
        mut events: Vec<DrawingEvent>,
    ) -> Result<(), GameCommandError> {
        if events.is_empty() {
            return Ok(());
        }
        let (_, shared) = self
            .repository
            .room_of(drawer)
            .await
            .ok_or(GameCommandError::NotInRoom)?;
        let outbox = {
            let mut room = shared.lock().await;
            if room.closed {
                return Err(GameCommandError::NotInRoom);
            }
            room.touch(self.clock.now_millis());
            if !room.is_drawer(drawer) {
                return Err(GameCommandError::NotDrawer);
            }
            if room.game.status != GameStatus::Drawing {
                return Err(GameCommandError::InvalidPhase(room.game.status));
            }
            if room.game.brush_sabotage_active {
                sabotage_sizes(&mut events, self.config.max_brush_size);
            }
            append_history(
                &mut room.drawing_history,
                &events,
                self.config.drawing_history_cap,
                self.config.drawing_history_keep,
            );

            let mut outbox = Outbox::new();
            outbox.room_except(&room, drawer, ServerEvent::DrawingBatch { events });
            outbox
        };
        publish(self.message_pusher.as_ref(), outbox).await;
        Ok(())
    }

    /// キャンバスを消す（描き手のみ）
    pub async fn clear(&self, drawer: &PlayerId) -> Result<(), GameCommandError> {
        let (_, shared) = self
            .repository
            .room_of(drawer)
            .await
            .ok_or(GameCommandError::NotInRoom)?;
        let outbox = {
            let mut room = shared.lock().await;
            if room.closed {
                return Err(GameCommandError::NotInRoom);
            }
            room.touch(self.clock.now_millis());
            if !room.is_drawer(drawer) {
                return Err(GameCommandError::NotDrawer);
            }
            room.drawing_history.clear();

            let mut outbox = Outbox::new();
            outbox.room_except(&room, drawer, ServerEvent::DrawingCleared);
            outbox
        };
        publish(self.message_pusher.as_ref(), outbox).await;
        Ok(())
    }
}

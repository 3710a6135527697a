//! Inbound command routing.
//!
//! 受信したテキストを `ClientCommand` に変換してユースケースに渡し、
//! エラーを分類に応じて通知・ログに振り分ける。
//! コマンド処理中の panic はそのプレイヤーのルームだけを閉じる。

use std::{panic::AssertUnwindSafe, sync::Arc};

use futures_util::FutureExt;

use crate::{
    domain::{PlayerId, ServerEvent},
    infrastructure::dto::websocket::ClientCommand,
    ui::state::AppState,
    usecase::{CommandError, ErrorClass},
};

/// 分類済みのエラー
struct Rejection {
    class: ErrorClass,
    notice: ServerEvent,
    message: String,
}

fn reject(error: impl CommandError) -> Rejection {
    Rejection {
        class: error.class(),
        notice: error.notice(),
        message: error.to_string(),
    }
}

/// Handle one text frame from a client.
pub async fn handle_client_text(state: &Arc<AppState>, player: &PlayerId, text: &str) {
    let command = match ClientCommand::parse(text) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!("Dropped message from '{}': {}", player, e);
            return;
        }
    };
    let name = command.name();
    tracing::debug!("Command '{}' from '{}'", name, player);

    match AssertUnwindSafe(dispatch(state, player, command))
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => {}
        Ok(Err(rejection)) => report(state, player, name, rejection).await,
        Err(_) => {
            tracing::error!("Command '{}' from '{}' panicked", name, player);
            state
                .orchestrator
                .close_room_of(player, "internal error")
                .await;
        }
    }
}

async fn dispatch(
    state: &AppState,
    player: &PlayerId,
    command: ClientCommand,
) -> Result<(), Rejection> {
    match command {
        ClientCommand::CreateRoom(payload) => state
            .create_room_usecase
            .execute(player, &payload.name, payload.avatar)
            .await
            .map(|_| ())
            .map_err(reject),
        ClientCommand::JoinRoom(payload) => state
            .join_room_usecase
            .execute(player, &payload.code, &payload.name, payload.avatar)
            .await
            .map(|_| ())
            .map_err(reject),
        ClientCommand::LeaveRoom => {
            state.leave_room_usecase.execute(player).await;
            Ok(())
        }
        ClientCommand::SetReady(payload) => state
            .set_ready_usecase
            .execute(player, payload.is_ready)
            .await
            .map_err(reject),
        ClientCommand::StartGame(payload) => state
            .orchestrator
            .start_game(player, payload.rounds, payload.round_duration)
            .await
            .map_err(reject),
        ClientCommand::RestartGame => state
            .orchestrator
            .restart_game(player)
            .await
            .map_err(reject),
        ClientCommand::SelectWord(payload) => state
            .orchestrator
            .select_word(player, &payload.word)
            .await
            .map_err(reject),
        ClientCommand::Chat(payload) => state
            .orchestrator
            .handle_chat(player, &payload.text)
            .await
            .map_err(reject),
        ClientCommand::GetPrice(payload) => state
            .powerup_usecase
            .get_price(player, payload.powerup_id, payload.target.as_deref())
            .await
            .map(|_| ())
            .map_err(reject),
        ClientCommand::Purchase(payload) => state
            .powerup_usecase
            .purchase(player, payload.powerup_id, payload.target.as_deref())
            .await
            .map(|_| ())
            .map_err(reject),
        ClientCommand::Activate(payload) => state
            .powerup_usecase
            .activate(player, payload.powerup_id, payload.target.as_deref())
            .await
            .map_err(reject),
        ClientCommand::DrawingBatch(payload) => {
            let events = payload.into_valid_events(&state.config.canvas_bounds());
            state
                .drawing_usecase
                .relay_batch(player, events)
                .await
                .map_err(reject)
        }
        ClientCommand::ClearDrawing => state.drawing_usecase.clear(player).await.map_err(reject),
    }
}

async fn report(state: &AppState, player: &PlayerId, command: &str, rejection: Rejection) {
    match rejection.class {
        ErrorClass::Validation => {
            tracing::warn!(
                "Rejected '{}' from '{}': {}",
                command,
                player,
                rejection.message
            );
        }
        ErrorClass::Authorization => {
            tracing::warn!(
                "Unauthorized '{}' from '{}': {}",
                command,
                player,
                rejection.message
            );
        }
        ErrorClass::NotFound => {
            tracing::debug!(
                "Ignored '{}' from '{}': {}",
                command,
                player,
                rejection.message
            );
            return;
        }
    }
    if let Err(e) = state
        .message_pusher
        .push_to(player, &rejection.notice)
        .await
    {
        tracing::warn!("Failed to deliver error to '{}': {}", player, e);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use doodlerush_shared::time::ManualClock;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::{
        config::GameConfig,
        usecase::{
            GameCommandError,
            test_support::{RecordingPusher, id},
        },
    };

    /// ログ出力をメモリにためる
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn state_with(pusher: Arc<RecordingPusher>) -> AppState {
        AppState::in_memory(GameConfig::default(), pusher, Arc::new(ManualClock::new(0)))
    }

    #[tokio::test]
    async fn test_validation_rejection_is_logged_at_warn_and_notified() {
        // テスト項目: 入力エラーは warn で記録され、本人に room.error が届く
        // given (前提条件):
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let pusher = Arc::new(RecordingPusher::default());
        let state = state_with(pusher.clone());

        // when (操作):
        let rejection = reject(GameCommandError::InvalidRounds { max: 10 });
        report(&state, &id("alice"), "game.start", rejection).await;

        // then (期待する結果):
        let output = logs.contents();
        assert!(output.contains("WARN"));
        assert!(output.contains("Rejected 'game.start' from 'alice'"));
        assert!(matches!(
            pusher.last(&id("alice")),
            Some(ServerEvent::RoomError { .. })
        ));
    }

    #[tokio::test]
    async fn test_not_found_rejection_is_silent() {
        // テスト項目: ルームが見つからないエラーは通知せず、warn にも出ない
        // given (前提条件):
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let pusher = Arc::new(RecordingPusher::default());
        let state = state_with(pusher.clone());

        // when (操作):
        report(&state, &id("alice"), "word.select", reject(GameCommandError::NotInRoom)).await;

        // then (期待する結果):
        assert!(logs.contents().is_empty());
        assert!(pusher.last(&id("alice")).is_none());
    }
}
